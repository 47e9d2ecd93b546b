use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AccessLinkPathParam {
    pub access_link_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemQuery {
    pub redirect_to: Option<String>,
}
