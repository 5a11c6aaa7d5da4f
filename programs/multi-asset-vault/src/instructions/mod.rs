pub mod add_asset;
pub mod add_strategy;
pub mod admin;
pub mod deposit;
pub mod initialize;
pub mod mint;
pub mod process_accounting;
pub mod process_calls;
pub mod rate_feed;
pub mod redeem;
pub mod set_processor_rule;
pub mod toggle_asset;
pub mod toggle_strategy;
pub mod view;
pub mod withdraw;

pub use add_asset::*;
pub use add_strategy::*;
pub use admin::*;
pub use deposit::*;
pub use initialize::*;
pub use process_accounting::*;
pub use process_calls::*;
pub use rate_feed::*;
pub use set_processor_rule::*;
pub use toggle_asset::*;
pub use toggle_strategy::*;
pub use view::*;
pub use withdraw::*;
