use crate::commands::{CmdMessage, CmdResult};
use crate::discovery;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::model::Scope;
use crate::store::BackendProvider;

/// Verifies `scope` and repairs what it can: adopts orphaned content, drops index
/// entries whose content is gone, refreshes stale size/checksum and sweeps
/// leftover temp files.
pub fn run<P: BackendProvider>(dispatcher: &mut Dispatcher<P>, scope: &Scope) -> Result<CmdResult> {
    let report = discovery::doctor(dispatcher.open(scope)?)?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
    } else {
        result.add_message(CmdMessage::warning("Inconsistencies found and fixed:"));
        if report.recovered > 0 {
            result.add_message(CmdMessage::success(format!(
                "  - Recovered {} note(s) found on disk but missing from the index.",
                report.recovered
            )));
        }
        if report.zombies_removed > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Removed {} note(s) listed in the index but missing from disk.",
                report.zombies_removed
            )));
        }
        if report.stats_refreshed > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Refreshed size and checksum of {} note(s).",
                report.stats_refreshed
            )));
        }
        if report.temp_files_removed > 0 {
            result.add_message(CmdMessage::info(format!(
                "  - Removed {} leftover temporary file(s).",
                report.temp_files_removed
            )));
        }
    }

    result.report = Some(report);
    Ok(result)
}
