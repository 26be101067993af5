pub mod coupon;
pub mod flow;
pub mod gateway;
pub mod poller;
pub mod pricing;
pub mod session;

pub use coupon::{validate_coupon, CouponValidation};
pub use flow::{register_free_usage, PaymentFlow};
pub use gateway::{HttpPaymentGateway, PaymentGateway};
pub use poller::{PollSettings, SettlementEvent};
pub use pricing::{AppliedCoupon, Price, PriceList, PricingQuote};
pub use session::{PayerForm, PaymentSession, PaymentState, SessionError};
