//! Satisfies and compare commands

use std::cmp::Ordering;

use sprig_core::error::SprigResult;
use sprig_core::types::{PrereleaseRanking, RangeExpression, Version, VersionComparator};

use super::CommandContext;

/// Execute the satisfies command, printing `true` or `false`
pub fn execute_satisfies(range: &str, version: &str, ctx: &CommandContext) -> SprigResult<()> {
    ctx.output.print(&satisfies(range, version)?.to_string());
    Ok(())
}

/// Execute the compare command, printing `<`, `=` or `>`
pub fn execute_compare(a: &str, b: &str, ranking: &PrereleaseRanking, ctx: &CommandContext) -> SprigResult<()> {
    ctx.output.print(ordering_symbol(compare(a, b, ranking)?));
    Ok(())
}

pub fn satisfies(range: &str, version: &str) -> SprigResult<bool> {
    let range = RangeExpression::parse(range)?;
    let version = Version::parse(version)?;
    Ok(range.is_satisfied_by(&version))
}

pub fn compare(a: &str, b: &str, ranking: &PrereleaseRanking) -> SprigResult<Ordering> {
    VersionComparator::new(ranking.clone()).compare_str(a, b)
}

pub fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}
