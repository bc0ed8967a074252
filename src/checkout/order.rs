//! Orders
//!
//! Assembles the "create order" payload from the cart and checkout totals and
//! hands it to an [`OrderSubmitter`]. Transport is the submitter's business.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Span, info};

use crate::{cart::Cart, items::LineItem, storage::CartRepository};

use super::{Checkout, CheckoutTotals};

/// Errors raised while placing an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Nothing to order.
    #[error("your cart is empty")]
    EmptyCart,

    /// Customer details failed validation.
    #[error("{0}")]
    InvalidDetails(&'static str),

    /// The order endpoint refused the order.
    #[error("failed to place order: {0}")]
    Rejected(String),
}

/// Postal address as exchanged with the storefront API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Saved address identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<u64>,

    /// Street line
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Country
    pub country: String,

    /// Postal code
    pub postal_code: String,

    /// Usable for billing
    #[serde(default)]
    pub is_billing: bool,

    /// Usable for shipping
    #[serde(default)]
    pub is_shipping: bool,

    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Free-form label such as "Home"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Payment method stub carried in the order payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment
    #[default]
    Card,

    /// PayPal
    Paypal,

    /// Apple Pay
    ApplePay,
}

/// Shopper contact details and shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Email address
    pub email: String,

    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Shipping address
    pub address: Address,
}

impl CustomerDetails {
    /// Check required fields, reporting the first problem found.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidDetails`] with a shopper-facing message.
    pub fn validate(&self) -> Result<(), OrderError> {
        let required = [
            (&self.first_name, "First name is required"),
            (&self.last_name, "Last name is required"),
            (&self.email, "Email is required"),
            (&self.address.street, "Address is required"),
            (&self.address.city, "City is required"),
            (&self.address.state, "State is required"),
            (&self.address.postal_code, "Postal code is required"),
            (&self.address.country, "Country is required"),
        ];

        if let Some(&(_, message)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(OrderError::InvalidDetails(message));
        }

        if !is_plausible_email(&self.email) {
            return Err(OrderError::InvalidDetails(
                "Please enter a valid email address",
            ));
        }

        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(i, ch)| ch == '.' && i > 0 && i + 1 < domain.len())
}

/// One line of the order payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product identifier
    pub product_id: String,

    /// Variant identifier, the product id when the line has no variant
    pub variant_id: String,

    /// Display name
    pub name: String,

    /// Unit price charged
    pub unit_price: Decimal,

    /// Number of units
    pub quantity: u32,

    /// Size label
    pub size: String,

    /// Colour label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Image reference
    pub image: String,
}

impl From<&LineItem> for OrderItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.id.clone(),
            variant_id: item.variant.clone().unwrap_or_else(|| item.id.clone()),
            name: item.name.clone(),
            unit_price: item.unit_price(),
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            image: item.image.clone(),
        }
    }
}

/// What the shopper submitted on the final checkout step.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Backend user id of the signed-in shopper
    pub user_id: u64,

    /// Contact details and shipping address
    pub customer: CustomerDetails,

    /// Billing address, `None` when it matches the shipping address
    pub billing_address: Option<Address>,

    /// Payment method stub
    pub payment_method: PaymentMethod,
}

/// Payload sent to the "create order" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    /// Ordered lines
    pub items: Vec<OrderItem>,

    /// Where to ship
    pub shipping_address: Address,

    /// Where to bill
    pub billing_address: Address,

    /// Payment method stub
    pub payment_method: PaymentMethod,

    /// Cart total
    pub subtotal: Decimal,

    /// Shipping charged
    pub shipping: Decimal,

    /// Tax charged
    pub tax: Decimal,

    /// Coupon discount
    pub discount: Decimal,

    /// Amount due
    pub total: Decimal,

    /// Applied coupon code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,

    /// Backend user id
    pub user_id: u64,

    /// Contact email
    pub email: String,

    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl OrderDraft {
    /// Build the payload for `items` priced by `totals`.
    pub fn new(
        items: &[LineItem],
        totals: &CheckoutTotals,
        coupon_code: Option<String>,
        request: OrderRequest,
    ) -> Self {
        let OrderRequest {
            user_id,
            customer,
            billing_address,
            payment_method,
        } = request;

        let mut shipping_address = customer.address;
        shipping_address.phone.clone_from(&customer.phone);

        let billing_address = billing_address.unwrap_or_else(|| shipping_address.clone());

        Self {
            items: items.iter().map(OrderItem::from).collect(),
            shipping_address,
            billing_address,
            payment_method,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.final_total,
            coupon_code,
            user_id,
            email: customer.email,
            phone: customer.phone,
        }
    }
}

/// Response of a successful order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Order identifier
    pub order_id: u64,

    /// Carrier tracking number
    pub tracking_number: String,

    /// Amount charged
    pub total_amount: Decimal,

    /// Delivery estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

/// The external "create order" endpoint.
#[cfg_attr(test, mockall::automock)]
pub trait OrderSubmitter {
    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Rejected`] when the endpoint refuses the order.
    fn create_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, OrderError>;
}

/// Validate, submit and, on success, clear the cart and coupon.
///
/// # Errors
///
/// Returns an [`OrderError`] if the cart is empty, the details are invalid or
/// the submitter refuses the order. The cart is untouched on error.
#[tracing::instrument(
    name = "checkout.place_order",
    skip_all,
    fields(
        user_id = request.user_id,
        lines = cart.line_count(),
        order_id = tracing::field::Empty
    ),
    err
)]
pub fn place_order<R, S>(
    cart: &mut Cart<R>,
    checkout: &mut Checkout,
    submitter: &S,
    request: OrderRequest,
) -> Result<OrderConfirmation, OrderError>
where
    R: CartRepository,
    S: OrderSubmitter + ?Sized,
{
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    request.customer.validate()?;

    let totals = checkout.totals(cart);
    let coupon_code = checkout.coupon().map(|coupon| coupon.code.clone());
    let draft = OrderDraft::new(cart.items(), &totals, coupon_code, request);

    let confirmation = submitter.create_order(&draft)?;

    Span::current().record("order_id", confirmation.order_id);

    cart.clear();
    checkout.remove_coupon();

    info!(
        order_id = confirmation.order_id,
        total = %draft.total,
        "placed order"
    );

    Ok(confirmation)
}
