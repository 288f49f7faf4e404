use crate::domain::provisioning::ProvisionError;
use rust_embed::Embed;
use std::collections::BTreeMap;

/// プロキシ設定テンプレートと補助スクリプトを埋め込む
#[derive(Embed)]
#[folder = "assets/"]
#[include = "*"]
#[include = "**/*"]
pub struct ProvisioningAssets;

pub const NGINX_SITE_TEMPLATE: &str = "nginx/volcano-dashboard.conf";

/// Loads an embedded asset and substitutes every `{{NAME}}` placeholder.
/// A placeholder without a value is an error, never left in the output.
pub fn render_asset(name: &str, vars: &BTreeMap<&str, String>) -> Result<String, ProvisionError> {
    let file =
        ProvisioningAssets::get(name).ok_or_else(|| ProvisionError::AssetMissing(name.to_string()))?;
    let template = String::from_utf8_lossy(&file.data).to_string();

    let mut rendered = template;
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }

    if let Some(start) = rendered.find("{{") {
        let end = rendered[start..]
            .find("}}")
            .map_or(rendered.len(), |offset| start + offset + 2);
        return Err(ProvisionError::AssetMissing(format!(
            "{name}: no value for placeholder {}",
            &rendered[start..end]
        )));
    }

    Ok(rendered)
}
