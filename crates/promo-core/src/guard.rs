//! Blue-green deployment guard
//!
//! While a blue-green deployment is in progress an environment runs two
//! versions of the same flow. Promoting from or into such an environment is
//! refused.

use std::collections::HashMap;

use crate::{CoreError, Diff, Result};

/// Names occurring more than once, in order of first appearance
pub fn duplicates<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();

    for name in names {
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter(|name| counts[name] > 1)
        .map(str::to_string)
        .collect()
}

/// Fail if any flow name repeats within one environment
pub fn ensure_not_mid_blue_green<'a, I>(env_id: &str, flows: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let flows = duplicates(flows);
    if flows.is_empty() {
        Ok(())
    } else {
        Err(CoreError::BlueGreenDeployment {
            env_id: env_id.to_string(),
            flows,
        })
    }
}

/// Run the guard for the incoming side, then the outgoing side
pub fn check_diff(diff: &Diff) -> Result<()> {
    for snapshot in [diff.incoming(), diff.outgoing()] {
        ensure_not_mid_blue_green(
            &snapshot.snapshot_id,
            snapshot.flows().chain(diff.common_flows()),
        )?;
    }
    Ok(())
}
