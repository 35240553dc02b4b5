//! PayTabs gateway adapter.

mod api_types;
mod paytabs_adapter;

pub use paytabs_adapter::{parse_response_status, PayTabsConfig, PayTabsGatewayAdapter};
