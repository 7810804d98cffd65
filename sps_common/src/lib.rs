mod money;

pub mod op;
mod secret;

pub use money::{Money, MoneyConversionError, SHOP_CURRENCY_CODE, SHOP_CURRENCY_SYMBOL};
pub use secret::Secret;
