/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (`log_date`, project start/end) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Money amounts (income, expense, budget) in whole currency units.
pub type Amount = i64;
