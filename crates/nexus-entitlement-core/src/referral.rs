//! Referral code generation

use nexus_db::AccountRepository;
use nexus_types::{ReferralCode, REFERRAL_ALPHABET};
use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::config::EntitlementConfig;
use crate::EntitlementError;

/// Draws referral codes and checks them against the account store.
///
/// The lookup is advisory: two concurrent sign-ups can both see a code as
/// free. The store's unique constraint decides, and callers retry with a new
/// code on a uniqueness violation.
#[derive(Debug, Clone)]
pub struct ReferralCodeGenerator {
    prefix: String,
    suffix_len: usize,
    max_attempts: u32,
}

impl ReferralCodeGenerator {
    /// Create a generator from the entitlement config
    pub fn new(config: &EntitlementConfig) -> Self {
        Self {
            prefix: config.referral_prefix.clone(),
            suffix_len: config.referral_suffix_len,
            max_attempts: config.referral_max_attempts,
        }
    }

    /// Maximum draws per [`generate`](Self::generate) call
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw a random candidate without consulting the store
    pub fn draw_candidate(&self) -> ReferralCode {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..self.suffix_len)
            .map(|_| char::from(REFERRAL_ALPHABET[rng.gen_range(0..REFERRAL_ALPHABET.len())]))
            .collect();
        ReferralCode::new(&self.prefix, &suffix)
    }

    /// Generate a code no existing account holds.
    ///
    /// Performs one store read per draw and no writes. Fails with
    /// [`EntitlementError::CodeSpaceExhausted`] once the attempt cap is hit.
    #[instrument(skip(self, accounts))]
    pub async fn generate(
        &self,
        accounts: &dyn AccountRepository,
    ) -> Result<ReferralCode, EntitlementError> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.draw_candidate();

            match accounts.find_by_referral_code(candidate.as_str()).await? {
                None => {
                    debug!(attempt, code = %candidate, "Referral code accepted");
                    return Ok(candidate);
                }
                Some(_) => {
                    debug!(attempt, code = %candidate, "Referral code collision, redrawing");
                }
            }
        }

        warn!(
            attempts = self.max_attempts,
            "Referral code space exhausted"
        );
        Err(EntitlementError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}
