//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► Confirmed ──► PaymentOfAdvance ──► ProductionAndPackaging ──► Delivery ──► ProjectBilling
///    │            │                │                      │
///    └────────────┴────────────────┴──────────────────────┴──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been created, awaiting confirmation.
    #[default]
    #[serde(rename = "Created")]
    Created,

    /// Order was confirmed by the customer.
    #[serde(rename = "Confirmed")]
    Confirmed,

    /// Order was canceled (terminal state).
    #[serde(rename = "Canceled")]
    Canceled,

    /// Advance payment received.
    #[serde(rename = "Payment of Advance")]
    PaymentOfAdvance,

    /// Goods are being produced and packed.
    #[serde(rename = "Production and Packaging")]
    ProductionAndPackaging,

    /// Goods are on their way to the customer.
    #[serde(rename = "Delivery")]
    Delivery,

    /// Order has been billed (terminal state).
    #[serde(rename = "Project Billing")]
    ProjectBilling,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Created,
        OrderStatus::Confirmed,
        OrderStatus::PaymentOfAdvance,
        OrderStatus::ProductionAndPackaging,
        OrderStatus::Delivery,
        OrderStatus::ProjectBilling,
        OrderStatus::Canceled,
    ];

    /// Returns true if the order can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Created)
    }

    /// Returns true if an advance payment can be recorded in this status.
    pub fn can_receive_payment(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if production can start in this status.
    pub fn can_start_production(&self) -> bool {
        matches!(self, OrderStatus::PaymentOfAdvance)
    }

    /// Returns true if delivery can start in this status.
    pub fn can_start_delivery(&self) -> bool {
        matches!(self, OrderStatus::ProductionAndPackaging)
    }

    /// Returns true if billing can be completed in this status.
    pub fn can_complete_billing(&self) -> bool {
        matches!(self, OrderStatus::Delivery)
    }

    /// Returns true if the order can be canceled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created
                | OrderStatus::Confirmed
                | OrderStatus::PaymentOfAdvance
                | OrderStatus::ProductionAndPackaging
        )
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::ProjectBilling)
    }

    /// Returns true if `action` is legal from this status.
    pub fn allows(&self, action: OrderAction) -> bool {
        match action {
            OrderAction::Confirm => self.can_confirm(),
            OrderAction::MarkPaymentReceived => self.can_receive_payment(),
            OrderAction::StartProduction => self.can_start_production(),
            OrderAction::StartDelivery => self.can_start_delivery(),
            OrderAction::CompleteBilling => self.can_complete_billing(),
            OrderAction::Cancel => self.can_cancel(),
        }
    }

    /// Returns the actions that are legal from this status.
    pub fn available_actions(&self) -> Vec<OrderAction> {
        OrderAction::ALL
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }

    /// Returns the status label.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::PaymentOfAdvance => "Payment of Advance",
            OrderStatus::ProductionAndPackaging => "Production and Packaging",
            OrderStatus::Delivery => "Delivery",
            OrderStatus::ProjectBilling => "Project Billing",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status transition that can be requested on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Confirm,
    MarkPaymentReceived,
    StartProduction,
    StartDelivery,
    CompleteBilling,
    Cancel,
}

impl OrderAction {
    /// All actions in lifecycle order.
    pub const ALL: [OrderAction; 6] = [
        OrderAction::Confirm,
        OrderAction::MarkPaymentReceived,
        OrderAction::StartProduction,
        OrderAction::StartDelivery,
        OrderAction::CompleteBilling,
        OrderAction::Cancel,
    ];

    /// Returns the status an order has after this action succeeds.
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderAction::Confirm => OrderStatus::Confirmed,
            OrderAction::MarkPaymentReceived => OrderStatus::PaymentOfAdvance,
            OrderAction::StartProduction => OrderStatus::ProductionAndPackaging,
            OrderAction::StartDelivery => OrderStatus::Delivery,
            OrderAction::CompleteBilling => OrderStatus::ProjectBilling,
            OrderAction::Cancel => OrderStatus::Canceled,
        }
    }

    /// Returns the action name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Confirm => "confirm",
            OrderAction::MarkPaymentReceived => "mark payment received",
            OrderAction::StartProduction => "start production",
            OrderAction::StartDelivery => "start delivery",
            OrderAction::CompleteBilling => "complete billing",
            OrderAction::Cancel => "cancel",
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
