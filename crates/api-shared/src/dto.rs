//! Request and response bodies for the REST API.
//!
//! Core model types are carried as-is so the wire format matches what the store persists
//! (camelCase keys, snake_case record types). Their OpenAPI schemas are given as free-form
//! objects.

use medwise_core::{
    BasicInfo, ChatMessage, ExtractedData, HealthcareInfo, MedicalRecord, RecordPatch,
    RecordType, UserProfile, VitalSigns,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// HEALTH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordsRes {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<MedicalRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordRes {
    #[schema(value_type = Object)]
    pub record: MedicalRecord,
}

/// Quick capture of a photographed or picked document.
///
/// Id and date are assigned by the server. A missing or blank title becomes the type's
/// default title.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecordReq {
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "lab_report")]
    pub record_type: RecordType,
    #[serde(default)]
    pub file_uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The three manual-entry steps submitted together.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryReq {
    #[schema(value_type = Object)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub healthcare_info: HealthcareInfo,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub vital_signs: VitalSigns,
}

/// Partial update of a record. Omitted fields are left alone; an empty string clears an
/// optional text field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRecordReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_uri: Option<String>,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub extracted_data: Option<ExtractedData>,
}

impl From<UpdateRecordReq> for RecordPatch {
    fn from(req: UpdateRecordReq) -> Self {
        RecordPatch {
            title: req.title,
            description: req.description,
            file_uri: req.file_uri,
            doctor_name: req.doctor_name,
            hospital_name: req.hospital_name,
            extracted_data: req.extracted_data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteRecordRes {
    /// Number of records removed. Zero when the id was unknown.
    pub removed: usize,
}

// ============================================================================
// PROFILE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileRes {
    #[schema(value_type = Option<Object>)]
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveProfileReq {
    #[schema(value_type = Object)]
    pub profile: UserProfile,
}

// ============================================================================
// CHAT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatHistoryRes {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessageReq {
    pub text: String,
    #[serde(default = "default_is_user")]
    pub is_user: bool,
    #[serde(default)]
    pub image_uri: Option<String>,
}

fn default_is_user() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageRes {
    #[schema(value_type = Object)]
    pub message: ChatMessage,
}

// ============================================================================
// MISC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SuccessRes {
    pub success: bool,
}
