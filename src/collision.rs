use crate::cli::InvalidSubnetPolicy;
use crate::error::{CheckError, FileAccessError};
use ipnet::{IpNet, Ipv4Net};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tracing::{debug, warn};

/// One `<identifier> <subnet>` line accepted from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetEntry {
    pub id: String,
    /// Subnet text exactly as written, used in the report.
    pub subnet: String,
    /// Normalized network used for comparison.
    pub network: IpNet,
}

impl SubnetEntry {
    pub fn parse(id: &str, subnet: &str) -> Result<Self, ipnet::AddrParseError> {
        Ok(Self {
            id: id.to_string(),
            subnet: subnet.to_string(),
            network: parse_subnet(subnet)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub new: SubnetEntry,
    pub existing: SubnetEntry,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Collision: {} ({}), {} ({})",
            self.new.subnet, self.new.id, self.existing.subnet, self.existing.id
        )
    }
}

/// Collisions in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub collisions: Vec<Collision>,
}

impl CollisionReport {
    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty()
    }
}

impl fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Found none");
        }
        for collision in &self.collisions {
            writeln!(f, "{collision}")?;
        }
        Ok(())
    }
}

/// Parses a CIDR string, masking off host bits instead of rejecting them.
/// A bare address is taken as a single-host network. IPv4 also accepts a
/// dotted netmask or hostmask after the slash (`10.0.0.0/255.255.255.0`,
/// `10.0.0.0/0.0.0.255`).
pub fn parse_subnet(value: &str) -> Result<IpNet, ipnet::AddrParseError> {
    let err = match value.parse::<IpNet>() {
        Ok(net) => return Ok(net.trunc()),
        Err(err) => err,
    };
    if let Ok(addr) = value.parse::<IpAddr>() {
        return Ok(IpNet::from(addr));
    }
    parse_masked_v4(value).ok_or(err)
}

fn parse_masked_v4(value: &str) -> Option<IpNet> {
    let (addr, mask) = value.split_once('/')?;
    let addr: Ipv4Addr = addr.parse().ok()?;
    let mask = u32::from(mask.parse::<Ipv4Addr>().ok()?);

    // Netmask is checked first, so 0.0.0.0 means /0 and 255.255.255.255 means /32.
    let prefix = if mask.leading_ones() + mask.trailing_zeros() == 32 {
        mask.leading_ones()
    } else if mask.leading_zeros() + mask.trailing_ones() == 32 {
        32 - mask.trailing_ones()
    } else {
        return None;
    };
    let net = Ipv4Net::new(addr, u8::try_from(prefix).ok()?).ok()?;
    Some(IpNet::V4(net.trunc()))
}

/// True when the two networks share at least one address.
pub fn overlaps(a: &IpNet, b: &IpNet) -> bool {
    // CIDR blocks are either nested or disjoint, so containment covers every overlap.
    a.contains(b) || b.contains(a)
}

/// Splits a line into `(identifier, subnet)` when it has exactly two tokens.
pub fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(id), Some(subnet), None) => Some((id, subnet)),
        _ => None,
    }
}

/// Accumulates entries and compares each new one against all earlier ones.
#[derive(Debug, Default)]
pub struct CollisionChecker {
    entries: Vec<SubnetEntry>,
    collisions: Vec<Collision>,
}

impl CollisionChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns the collisions it caused, oldest match first.
    pub fn push(&mut self, entry: SubnetEntry) -> &[Collision] {
        let start = self.collisions.len();
        for existing in &self.entries {
            if overlaps(&entry.network, &existing.network) {
                self.collisions.push(Collision {
                    new: entry.clone(),
                    existing: existing.clone(),
                });
            }
        }
        self.entries.push(entry);
        &self.collisions[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn finish(self) -> CollisionReport {
        CollisionReport {
            collisions: self.collisions,
        }
    }
}

/// Runs collision detection over `reader`; `origin` names the input in errors.
pub fn check_reader<R: BufRead>(
    reader: R,
    origin: &Path,
    policy: InvalidSubnetPolicy,
) -> Result<CollisionReport, CheckError> {
    let mut checker = CollisionChecker::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FileAccessError::from_io(origin, e))?;
        let Some((id, subnet)) = split_entry(&line) else {
            continue;
        };

        let entry = match SubnetEntry::parse(id, subnet) {
            Ok(entry) => entry,
            Err(source) => {
                let line = idx + 1;
                match policy {
                    InvalidSubnetPolicy::Abort => {
                        return Err(CheckError::InvalidSubnet {
                            line,
                            value: subnet.to_string(),
                            source,
                        })
                    }
                    InvalidSubnetPolicy::Skip => {
                        warn!(line, %subnet, %id, "skipping invalid subnet");
                        continue;
                    }
                }
            }
        };

        let found = checker.push(entry).len();
        if found > 0 {
            debug!(%id, %subnet, found, "subnet overlaps earlier entries");
        }
    }

    debug!(entries = checker.len(), "collision check finished");
    Ok(checker.finish())
}

pub fn check_file(path: &Path, policy: InvalidSubnetPolicy) -> Result<CollisionReport, CheckError> {
    let file = File::open(path).map_err(|e| FileAccessError::from_io(path, e))?;
    check_reader(BufReader::new(file), path, policy)
}
