//! Customers Data

/// New customer registration data.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,

    /// Physical fob to attach at registration time.
    pub rfid: Option<String>,
}

/// New RFID identifier data.
#[derive(Debug, Clone)]
pub struct NewIdentifier {
    pub value: String,
    pub label: Option<String>,
}
