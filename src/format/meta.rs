use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Version of the FormatMetaV1
pub const FORMAT_META_VERSION_V1: &str = "1";

// format.json has the shape:
// {
//   "version": "1",
//   "format": "xl",
//   "id": "<deployment uuid>",
//   "xl": { ... }
// }
// The backend section is flattened next to these fields by the backend
// format struct.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormatMetaV1 {
    pub version: String, // Version of the format config.
    pub format: String,  // The backend format type, only 'xl' is supported.
    pub id: Uuid,        // The identifier for the deployment.
}
