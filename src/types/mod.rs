pub mod forecast_result;
pub mod record;
pub mod timestamp_key;
pub mod variable;
pub mod year_series;
