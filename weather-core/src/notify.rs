use std::fmt::Debug;

/// Where failed searches are reported to the user.
///
/// Called synchronously, once per failed attempt.
pub trait NotificationSurface: Send + Sync + Debug {
    fn alert(&self, title: &str, message: &str);
}
