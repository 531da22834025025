use serde::{Deserialize, Serialize};

use crate::error::BrandlensError;

/// Identity of the property being measured plus its competitive set.
///
/// Passed explicitly into every scoring call. The scoring core reads no
/// ambient configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub brand_name: String,
    /// Domains that count as "the brand" (exact or subdomain match).
    pub brand_domains: Vec<String>,
    /// Known competitor domains. Reporting only, never affects brand detection.
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl EvaluationContext {
    /// Reject contexts that must never reach the scorer. A context without
    /// brand domains cannot detect anything; callers surface that as a
    /// configuration error instead of scoring the run to zero.
    pub fn validate(&self) -> Result<(), BrandlensError> {
        if self.brand_name.trim().is_empty() {
            return Err(BrandlensError::BlankBrandName);
        }
        if self.brand_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(BrandlensError::EmptyBrandDomains);
        }
        Ok(())
    }
}
