use crate::errors::ToolError;
use crate::model::{opt_string_vec, require_i64, require_str};
use crate::utils::time::epoch_millis_to_utc;
use serde::Serialize;
use serde_json::Value;

/// One domain attached to a protected site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDomain {
    pub id: i64,
    pub name: String,
    pub site_id: i64,
    pub status: String,
    pub creation_date: String,
    /// Apex domains publish A records instead of a CNAME.
    #[serde(rename = "aRecords", skip_serializing_if = "Option::is_none")]
    pub a_records: Option<Vec<String>>,
    pub cname: String,
}

impl SiteDomain {
    pub fn from_json(record: &Value) -> Result<Self, ToolError> {
        let creation_millis = require_i64(record, "creationDate")?;
        Ok(Self {
            id: require_i64(record, "id")?,
            name: require_str(record, "domain")?,
            site_id: require_i64(record, "siteId")?,
            status: require_str(record, "status")?,
            creation_date: epoch_millis_to_utc(creation_millis)?,
            a_records: opt_string_vec(record, "arecords")?,
            cname: require_str(record, "cname")?,
        })
    }
}
