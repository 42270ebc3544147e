//! Built-in catalog for the telecom/fintech star schema.

use std::collections::BTreeMap;

use crate::model::{Catalog, Relationship};

const TIME_DIMENSION: &str = "Time_Dimension";
const TIME_ID: &str = "Time_ID";

const PRIMARY_KEYS: [(&str, &str); 14] = [
    ("Transactions", "Transaction_ID"),
    ("Accounts", "Account_ID"),
    ("Subscribers", "Subscriber_ID"),
    ("Agents", "Agent_ID"),
    ("AuditLogs", "Audit_ID"),
    ("CallLogs", "Call_ID"),
    ("SupportLogs", "Log_ID"),
    ("AppInfo", "App_ID"),
    ("Messages", "Message_ID"),
    ("SIMInfo", "SIM_ID"),
    ("ISPTraffic", "Traffic_ID"),
    ("DeviceInfo", "Device_ID"),
    ("SocialMediaLogs", "Post_Id"),
    ("CryptoLedgers", "Public_Address_Sender"),
];

// (primary_table, primary_key, foreign_table, foreign_key)
const RELATIONSHIPS: [(&str, &str, &str, &str); 25] = [
    ("Accounts", "Account_ID", "Transactions", "Account_ID"),
    ("Agents", "Agent_ID", "Transactions", "Agent_ID"),
    ("Subscribers", "Subscriber_ID", "Transactions", "Subscriber_ID"),
    (TIME_DIMENSION, TIME_ID, "Transactions", "Time_Foreign_ID"),
    ("Subscribers", "Subscriber_ID", "CallLogs", "Subscriber_ID"),
    (TIME_DIMENSION, TIME_ID, "CallLogs", "Date_Time_Foreign_ID"),
    ("Subscribers", "Subscriber_ID", "ISPTraffic", "Subscriber_ID"),
    (TIME_DIMENSION, TIME_ID, "ISPTraffic", "Time_Foreign_ID"),
    ("Subscribers", "Subscriber_ID", "SIMInfo", "Subscriber_ID"),
    (TIME_DIMENSION, TIME_ID, "SIMInfo", "Expiry_Date_Foreign_ID"),
    ("Accounts", "Account_ID", "SupportLogs", "Account_ID"),
    (TIME_DIMENSION, TIME_ID, "SupportLogs", "Foreign_Resolved_Date_ID"),
    ("Agents", "Agent_ID", "SupportLogs", "Agent_ID"),
    ("Accounts", "Account_ID", "AuditLogs", "Account_ID"),
    (TIME_DIMENSION, TIME_ID, "AuditLogs", "Creation_Time_Foreign_ID"),
    ("Accounts", "Account_holder_email", "SocialMediaLogs", "Email"),
    ("Subscribers", "Subscriber_email", "SocialMediaLogs", "Email"),
    (TIME_DIMENSION, TIME_ID, "SocialMediaLogs", "Time_Foreign_ID"),
    ("Transactions", "Transaction_ID", "CryptoLedgers", "Transaction_ID"),
    (TIME_DIMENSION, TIME_ID, "CryptoLedgers", "TimeStamp_Foreign_ID"),
    (TIME_DIMENSION, TIME_ID, "Accounts", "Creation_Time_Foreign_ID"),
    (TIME_DIMENSION, TIME_ID, "Subscribers", "Subscriber_expiry_date_Foreign_ID"),
    (TIME_DIMENSION, TIME_ID, "Agents", "Creation_Time_Foreign_ID"),
    (TIME_DIMENSION, TIME_ID, "AppInfo", "Date_Time_Foreign_ID"),
    (TIME_DIMENSION, TIME_ID, "Messages", "Time_Foreign_ID"),
];

impl Catalog {
    /// The telecom/fintech catalog.
    ///
    /// `Time_Dimension` is referenced by most tables but is not a declared
    /// primary-key owner, so it is never padded; its rows come from the time
    /// dimension derivation and from reconciliation.
    pub fn telecom() -> Self {
        let primary_keys: BTreeMap<String, String> = PRIMARY_KEYS
            .iter()
            .map(|(table, column)| (table.to_string(), column.to_string()))
            .collect();

        let relationships = RELATIONSHIPS
            .iter()
            .map(|(primary_table, primary_key, foreign_table, foreign_key)| {
                Relationship::new(*primary_table, *primary_key, *foreign_table, *foreign_key)
            })
            .collect();

        Catalog::new(primary_keys, relationships)
    }
}
