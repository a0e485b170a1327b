use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct DepartmentStatsResponse {
    pub name: String,
    #[serde(rename = "avgRating")]
    pub avg_rating: f64,
    pub patients: i64,
    pub doctors: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatIcon {
    pub path: String,
    #[serde(rename = "bgColor")]
    pub bg_color: String,
}

/// One dashboard card
#[derive(Debug, Serialize, Deserialize)]
pub struct HospitalStatResponse {
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: String,
    pub icon: StatIcon,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopPerformer {
    pub name: String,
    pub specialty: String,
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpecialtyCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStatsResponse {
    pub total_doctors: i64,
    pub average_rating: f64,
    pub top_performers: Vec<TopPerformer>,
    pub specialties: Vec<SpecialtyCount>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdmissionsResponse {
    pub name: String,
    pub emergency: i64,
    pub scheduled: i64,
}
