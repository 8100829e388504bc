use crate::k8s;
use crate::output;
use crate::runner::Runner;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectSummary {
    pub namespaces: usize,
    pub pods_scanned: usize,
    pub pods_matched: usize,
    pub lines_written: usize,
    /// Failures recorded inline in the output.
    pub errors: usize,
}

/// Writes the logs of every pod running `image` to `out`, each line prefixed
/// with `<pod>.<namespace> `. Per-namespace and per-pod failures are written
/// inline; only namespace enumeration and output errors abort.
pub fn collect_logs_by_image<W: Write>(
    runner: &impl Runner,
    image: &str,
    out: &mut W,
) -> Result<CollectSummary> {
    let namespaces = k8s::list_namespaces(runner)?;
    collect_from_namespaces(runner, &namespaces, image, out)
}

/// Same as `collect_logs_by_image` for an already enumerated namespace list.
/// Parameters: `namespaces` (&[String]) namespaces to scan in order.
/// Returns: Result<CollectSummary> counts of what was scanned and written.
pub fn collect_from_namespaces<W: Write>(
    runner: &impl Runner,
    namespaces: &[String],
    image: &str,
    out: &mut W,
) -> Result<CollectSummary> {
    let mut summary = CollectSummary {
        namespaces: namespaces.len(),
        ..Default::default()
    };

    for namespace in namespaces {
        let pods = match k8s::list_pods(runner, namespace) {
            Ok(pods) => pods,
            Err(err) => {
                warn!(%namespace, "failed to list pods: {err:#}");
                writeln!(out, "Error retrieving pods in namespace {namespace}: {err:#}")?;
                summary.errors += 1;
                continue;
            }
        };

        for pod in &pods {
            summary.pods_scanned += 1;
            let qualified = format!("{pod}.{namespace}");
            match collect_pod(runner, namespace, pod, image, &qualified, out) {
                Ok(None) => {}
                Ok(Some(lines)) => {
                    summary.pods_matched += 1;
                    summary.lines_written += lines;
                }
                Err(err) => {
                    warn!(pod = %qualified, "failed to collect logs: {err:#}");
                    writeln!(out, "{qualified} Error retrieving logs: {err:#}\n")?;
                    summary.errors += 1;
                }
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

// Ok(None) when the pod does not run the image.
fn collect_pod<W: Write>(
    runner: &impl Runner,
    namespace: &str,
    pod: &str,
    image: &str,
    qualified: &str,
    out: &mut W,
) -> Result<Option<usize>> {
    // Exact match on the image reference, tag included.
    let images = k8s::pod_images(runner, namespace, pod)?;
    if !images.iter().any(|i| i == image) {
        return Ok(None);
    }

    let logs = k8s::pod_logs(runner, namespace, pod)?;
    let mut count = 0;
    for line in logs.lines() {
        writeln!(out, "{qualified} {line}")?;
        count += 1;
    }
    Ok(Some(count))
}

/// Collects into `path` (`-` for stdout).
pub fn collect_to_file(runner: &impl Runner, image: &str, path: &Path) -> Result<CollectSummary> {
    // Only truncate the output once the cluster answered.
    let namespaces = k8s::list_namespaces(runner)?;
    let mut sink = output::open_sink(path)?;
    let summary = collect_from_namespaces(runner, &namespaces, image, &mut sink)
        .with_context(|| format!("failed to collect logs into {}", path.display()))?;
    info!(
        namespaces = summary.namespaces,
        pods = summary.pods_scanned,
        matched = summary.pods_matched,
        lines = summary.lines_written,
        errors = summary.errors,
        "log collection finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FakeRunner;

    const NS: &str = "kubectl get namespaces -o jsonpath={.items[*].metadata.name}";

    fn pods(ns: &str) -> String {
        format!("kubectl get pods -n {ns} -o jsonpath={{.items[*].metadata.name}}")
    }

    fn images(ns: &str, pod: &str) -> String {
        format!("kubectl get pod {pod} -n {ns} -o jsonpath={{.spec.containers[*].image}}")
    }

    fn logs(ns: &str, pod: &str) -> String {
        format!("kubectl logs {pod} -n {ns}")
    }

    #[test]
    fn collects_matching_pods_only() {
        let runner = FakeRunner::new()
            .respond(NS, "default prod")
            .respond(&pods("default"), "a b")
            .respond(&pods("prod"), "c")
            .respond(&images("default", "a"), "ip-tool:latest sidecar:1")
            .respond(&images("default", "b"), "nginx:1.25")
            .respond(&images("prod", "c"), "ip-tool:latest")
            .respond(&logs("default", "a"), "started\nready")
            .respond(&logs("prod", "c"), "hello");

        let mut out = Vec::new();
        let summary = collect_logs_by_image(&runner, "ip-tool:latest", &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a.default started\na.default ready\nc.prod hello\n"
        );
        assert_eq!(
            summary,
            CollectSummary {
                namespaces: 2,
                pods_scanned: 3,
                pods_matched: 2,
                lines_written: 3,
                errors: 0,
            }
        );
        assert!(!runner.recorded().iter().any(|c| c.args == ["logs", "b", "-n", "default"]));
    }

    #[test]
    fn failures_are_recorded_inline() {
        let runner = FakeRunner::new()
            .respond(NS, "broken prod")
            .fail(&pods("broken"), "forbidden")
            .respond(&pods("prod"), "x y")
            .respond(&images("prod", "x"), "ip-tool:latest")
            .fail(&logs("prod", "x"), "container not ready")
            .respond(&images("prod", "y"), "ip-tool:latest")
            .respond(&logs("prod", "y"), "ok");

        let mut out = Vec::new();
        let summary = collect_logs_by_image(&runner, "ip-tool:latest", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Error retrieving pods in namespace broken:"));
        assert!(lines[0].contains("forbidden"));
        assert!(lines[1].starts_with("x.prod Error retrieving logs:"));
        assert!(lines[1].contains("container not ready"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "y.prod ok");
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.pods_matched, 1);
    }

    #[test]
    fn namespace_failure_aborts() {
        let runner = FakeRunner::new().fail(NS, "no cluster");
        let mut out = Vec::new();
        let err = collect_logs_by_image(&runner, "ip-tool:latest", &mut out).unwrap_err();
        assert!(format!("{err:#}").contains("no cluster"));
        assert!(out.is_empty());
    }

    #[test]
    fn collect_to_file_writes_output() {
        let runner = FakeRunner::new()
            .respond(NS, "default")
            .respond(&pods("default"), "a")
            .respond(&images("default", "a"), "img:1")
            .respond(&logs("default", "a"), "line");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        let summary = collect_to_file(&runner, "img:1", &path).unwrap();

        assert_eq!(summary.lines_written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.default line\n");
    }

    #[test]
    fn namespace_failure_leaves_existing_file_untouched() {
        let runner = FakeRunner::new().fail(NS, "no cluster");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");
        std::fs::write(&path, "previous run\n").unwrap();

        let err = collect_to_file(&runner, "img:1", &path).unwrap_err();
        assert!(format!("{err:#}").contains("no cluster"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run\n");
    }

    #[test]
    fn log_lines_keep_their_whitespace() {
        let runner = FakeRunner::new()
            .respond(NS, "default\n")
            .respond(&pods("default"), "a\n")
            .respond(&images("default", "a"), "img:1\n")
            .respond(&logs("default", "a"), "  at frame\n\tcaused by\n\n");

        let mut out = Vec::new();
        let summary = collect_logs_by_image(&runner, "img:1", &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a.default   at frame\na.default \tcaused by\na.default \n"
        );
        assert_eq!(summary.lines_written, 3);
    }
}
