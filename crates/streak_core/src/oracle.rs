use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle backend unavailable: {0}")]
    Unavailable(String),
    #[error("oracle backend rejected the request: {0}")]
    Rejected(String),
}

/// External verdict backends will implement this trait; the engine treats
/// any failure as a denial.
pub trait Oracle: Send + Sync {
    fn consult(&self, streak_days: i64, rank_title: &str) -> Result<String, OracleError>;
}

pub const OFFLINE_VERDICT: &str = "CONNECTION ERROR. DENIED.";

pub const CANNED_VERDICTS: [&str; 5] = [
    "NO",
    "NOT TODAY",
    "DEFINITELY NOT",
    "ACCESS DENIED",
    "TRY AGAIN TOMORROW",
];

pub fn canned_verdict(streak_days: i64) -> &'static str {
    let index = streak_days.rem_euclid(CANNED_VERDICTS.len() as i64) as usize;
    CANNED_VERDICTS[index]
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CannedOracle;

impl Oracle for CannedOracle {
    fn consult(&self, streak_days: i64, _rank_title: &str) -> Result<String, OracleError> {
        Ok(canned_verdict(streak_days).to_string())
    }
}
