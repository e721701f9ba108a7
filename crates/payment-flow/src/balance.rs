//! Credit balance calculation.

use podcore_client::UserAccount;

/// Markup applied to a negative balance when computing the amount payable.
pub const BALANCE_MARKUP: f64 = 1.5;

/// Balance in credits: limit minus used. Negative means the account owes.
///
/// Missing or unparseable fields count as zero rather than failing.
pub fn balance_credits(credit_limit: Option<f64>, credit_used: Option<f64>) -> f64 {
    credit_limit.unwrap_or(0.0) - credit_used.unwrap_or(0.0)
}

/// Amount owed in currency: zero for a non-negative balance, otherwise the
/// owed credits with the fixed markup applied.
pub fn amount_payable(balance: f64) -> f64 {
    if balance >= 0.0 {
        0.0
    } else {
        -balance * BALANCE_MARKUP
    }
}

/// Derived credit figures for a user, as rendered by the credits view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditSummary {
    pub total: f64,
    pub used: f64,
    pub available: f64,
    pub amount_payable: f64,
}

impl CreditSummary {
    pub fn of(user: &UserAccount) -> Self {
        let total = user.user_credit_limit.unwrap_or(0.0);
        let used = user.user_credit_used.unwrap_or(0.0);
        let available = balance_credits(user.user_credit_limit, user.user_credit_used);
        Self {
            total,
            used,
            available,
            amount_payable: amount_payable(available),
        }
    }

    /// Credits owed, i.e. the magnitude of a negative balance.
    pub fn credits_owed(&self) -> f64 {
        (-self.available).max(0.0)
    }

    /// Whether the pay action is enabled.
    pub fn can_pay(&self) -> bool {
        self.amount_payable > 0.0
    }
}
