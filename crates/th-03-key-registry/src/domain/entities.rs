/// Result of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The account was new and is now registered.
    Created,
    /// The account was already registered with the same key. Nothing changed.
    AlreadyRegistered,
}
