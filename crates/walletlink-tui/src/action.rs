//! Actions for state updates.

use walletlink_core::{ConnectionState, TransferFormState};

/// Editable field of the transfer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Recipient,
    Amount,
    GasPrice,
    GasLimit,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Recipient,
            FormField::Amount,
            FormField::GasPrice,
            FormField::GasLimit,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Recipient => "Recipient",
            FormField::Amount => "Amount",
            FormField::GasPrice => "Gas price (gwei)",
            FormField::GasLimit => "Gas limit",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            FormField::Recipient => 0,
            FormField::Amount => 1,
            FormField::GasPrice => 2,
            FormField::GasLimit => 3,
        }
    }

    pub fn next(&self) -> FormField {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn prev(&self) -> FormField {
        let all = Self::all();
        all[(self.index() + all.len() - 1) % all.len()]
    }

    /// Current value of this field in the form state.
    pub fn value<'a>(&self, form: &'a TransferFormState) -> &'a str {
        match self {
            FormField::Recipient => &form.recipient,
            FormField::Amount => &form.amount,
            FormField::GasPrice => &form.gas_price_gwei,
            FormField::GasLimit => &form.gas_limit,
        }
    }
}

/// Actions that can update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Request account access from the wallet.
    Connect,
    /// Forget the current session.
    Disconnect,
    /// Re-read balance and network now.
    RefreshBalance,
    /// Ask the wallet to switch to Ethereum mainnet.
    SwitchToMainnet,
    /// Show or hide the transfer form.
    ToggleSendForm,
    /// Hide the transfer form.
    CloseSendForm,
    /// Commit an edited form field.
    EditField(FormField, String),
    /// Ask the wallet for a fresh gas price.
    EstimateGasPrice,
    /// Submit the transfer.
    Send,
    /// Connection manager published a new state.
    SetConnectionState(ConnectionState),
    /// Transfer form published a new state.
    SetFormState(TransferFormState),
    /// Quit the application.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_cycle() {
        assert_eq!(FormField::Recipient.next(), FormField::Amount);
        assert_eq!(FormField::GasLimit.next(), FormField::Recipient);
        assert_eq!(FormField::Recipient.prev(), FormField::GasLimit);
        for field in FormField::all() {
            assert_eq!(field.next().prev(), *field);
        }
    }

    #[test]
    fn test_field_value() {
        let form = TransferFormState {
            recipient: "0xabc".to_string(),
            amount: "1.5".to_string(),
            gas_price_gwei: "20".to_string(),
            ..Default::default()
        };
        assert_eq!(FormField::Recipient.value(&form), "0xabc");
        assert_eq!(FormField::Amount.value(&form), "1.5");
        assert_eq!(FormField::GasPrice.value(&form), "20");
        assert_eq!(FormField::GasLimit.value(&form), "21000");
    }
}
