//! Error handling and exit codes.

use courtside_core::constants::exit_codes;
use courtside_core::CoreError;
use courtside_orchestration::DispatchError;

/// Map a run-stopping error to the process exit code.
///
/// Job-level failures never reach this point: they are reported per line and
/// turned into [`exit_codes::ERROR_JOB_FAILURES`] by the caller.
pub fn handle_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.downcast_ref::<CoreError>().is_some() {
            return exit_codes::ERROR_CONFIG;
        }
        if let Some(DispatchError::Pool(_)) = cause.downcast_ref::<DispatchError>() {
            return exit_codes::ERROR_CONFIG;
        }
    }
    exit_codes::ERROR_GENERIC
}
