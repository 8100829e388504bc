use crate::runner::Runner;
use anyhow::{Context, Result};

const KUBECTL: &str = "kubectl";

fn split_names(output: &str) -> Vec<String> {
    // jsonpath lists are space separated with a trailing newline.
    output.split_whitespace().map(str::to_string).collect()
}

/// Lists all namespace names visible to the current kube context.
/// Parameters: `runner` (&impl Runner) command runner.
/// Returns: Result<Vec<String>> namespace names.
pub fn list_namespaces(runner: &impl Runner) -> Result<Vec<String>> {
    // Every later query is scoped to one of these namespaces.
    let args = ["get", "namespaces", "-o", "jsonpath={.items[*].metadata.name}"];
    let out = runner
        .run_capture(KUBECTL, &args)
        .context("failed to list namespaces")?;
    Ok(split_names(&out))
}

/// Lists pod names in a namespace.
/// Parameters: `runner` (&impl Runner) command runner.
/// Parameters: `namespace` (&str) namespace to list.
/// Returns: Result<Vec<String>> pod names, empty when the namespace has none.
pub fn list_pods(runner: &impl Runner, namespace: &str) -> Result<Vec<String>> {
    // Errors surface bare; the collector records them per namespace.
    let args = [
        "get",
        "pods",
        "-n",
        namespace,
        "-o",
        "jsonpath={.items[*].metadata.name}",
    ];
    let out = runner.run_capture(KUBECTL, &args)?;
    Ok(split_names(&out))
}

/// Returns the images of every container in the pod spec.
/// Parameters: `runner` (&impl Runner) command runner.
/// Parameters: `namespace` (&str) pod namespace.
/// Parameters: `pod` (&str) pod name.
/// Returns: Result<Vec<String>> image references as written in the spec.
pub fn pod_images(runner: &impl Runner, namespace: &str, pod: &str) -> Result<Vec<String>> {
    // Init containers are not part of `.spec.containers`.
    let args = [
        "get",
        "pod",
        pod,
        "-n",
        namespace,
        "-o",
        "jsonpath={.spec.containers[*].image}",
    ];
    let out = runner.run_capture(KUBECTL, &args)?;
    Ok(split_names(&out))
}

/// Fetches the current logs of a pod.
/// Parameters: `runner` (&impl Runner) command runner.
/// Parameters: `namespace` (&str) pod namespace.
/// Parameters: `pod` (&str) pod name.
/// Returns: Result<String> raw log text, whitespace preserved.
pub fn pod_logs(runner: &impl Runner, namespace: &str, pod: &str) -> Result<String> {
    // Default container only, as `kubectl logs` picks it.
    runner.run_capture(KUBECTL, &["logs", pod, "-n", namespace])
}
