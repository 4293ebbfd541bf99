pub const VERSION: &str = "0.1.0";
pub const AUTHOR: &str = "The otkit developers";
