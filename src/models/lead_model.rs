use serde::Deserialize;

/// Un empleo devuelto por el actor de búsqueda.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScrapedJob {
    pub job_url: Option<String>,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_website: Option<String>,
    pub employment_type: Option<String>,
    pub posted_datetime: Option<String>,
    pub company_street: Option<String>,
    pub company_locality: Option<String>,
}

/// Registro crudo del scraper de detalles de contacto.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ContactDetailRecord {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default, rename = "phonesUncertain")]
    pub phones_uncertain: Vec<String>,
    #[serde(default, rename = "linkedIns")]
    pub linkedins: Vec<String>,
    #[serde(default)]
    pub twitters: Vec<String>,
    #[serde(default)]
    pub instagrams: Vec<String>,
    #[serde(default)]
    pub facebooks: Vec<String>,
    #[serde(default)]
    pub youtubes: Vec<String>,
    #[serde(default)]
    pub tiktoks: Vec<String>,
    #[serde(default)]
    pub pinterests: Vec<String>,
    #[serde(default)]
    pub discords: Vec<String>,
}

/// Información de contacto agregada y limpia, lista para la hoja.
/// Los emails y teléfonos van separados por coma.
#[derive(Debug, Clone, Default)]
pub struct ContactInfo {
    pub domain: String,
    pub emails: String,
    pub phones: String,
    pub linkedin: String,
    pub twitter: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub tiktok: String,
    pub pinterest: String,
    pub discord: String,
}
