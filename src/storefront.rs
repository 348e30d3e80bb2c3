use anyhow::{anyhow, Result};
use log::{error, info};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::config::SetupConfig;
use crate::pimcore::{find_class, ClassDescriptor};

pub const TARGET_CONFIG_FILE: &str = "config.json";
pub const SOURCE_CONFIG_FILE: &str = "config.example.json";

/// Overlays the collected answers onto the example config and writes the
/// result. The target file is replaced unconditionally; template keys that
/// are not overridden here pass through untouched.
pub fn create_config(
    template: &Path,
    target: &Path,
    config: &SetupConfig,
    classes: &[ClassDescriptor],
) -> Result<()> {
    info!("Creating storefront config '{}'", target.display());

    build_and_write(template, target, config, classes).map_err(|e| {
        error!("{:#}", e);
        anyhow!("Can't create storefront config.")
    })
}

fn build_and_write(
    template: &Path,
    target: &Path,
    config: &SetupConfig,
    classes: &[ClassDescriptor],
) -> Result<()> {
    let raw = fs::read_to_string(template)
        .map_err(|e| anyhow!("Failed to read template {}: {}", template.display(), e))?;
    let mut document: Value = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("Failed to parse template {}: {}", template.display(), e))?;

    {
        let elasticsearch = section(&mut document, "elasticsearch")?;
        elasticsearch.insert(
            "host".to_string(),
            Value::String(config.elasticsearch_url.clone()),
        );
        elasticsearch.insert(
            "indexName".to_string(),
            Value::String(config.elasticsearch_index_name.clone()),
        );
    }

    {
        let pimcore = section(&mut document, "pimcore")?;
        pimcore.insert("url".to_string(), Value::String(config.pimcore_url.clone()));
        pimcore.insert(
            "assetsPath".to_string(),
            Value::String(config.assets_path.clone()),
        );
        pimcore.insert("apiKey".to_string(), Value::String(config.api_key.clone()));
        pimcore.insert(
            "rootCategoryId".to_string(),
            Value::from(config.root_category_id),
        );
        pimcore.insert("locale".to_string(), Value::String(config.locale.clone()));
    }

    merge_class(&mut document, "productClass", &config.product_class, classes)?;
    merge_class(&mut document, "categoryClass", &config.category_class, classes)?;

    let rendered = format!("{}\n", serde_json::to_string_pretty(&document)?);
    fs::write(target, rendered)
        .map_err(|e| anyhow!("Failed to write {}: {}", target.display(), e))?;

    Ok(())
}

fn section<'a>(document: &'a mut Value, key: &str) -> Result<&'a mut Map<String, Value>> {
    document
        .get_mut(key)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow!("Template is missing the '{}' section", key))
}

/// Merges the named class definition into the template's class object,
/// keeping template keys the webservice does not report.
fn merge_class(
    document: &mut Value,
    key: &str,
    class_name: &str,
    classes: &[ClassDescriptor],
) -> Result<()> {
    let descriptor = find_class(classes, class_name)
        .ok_or_else(|| anyhow!("Pimcore does not define a '{}' class", class_name))?;
    let fields = serde_json::to_value(descriptor)?;

    let target = document
        .get_mut("pimcore")
        .and_then(|pimcore| pimcore.get_mut(key))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| anyhow!("Template is missing the 'pimcore.{}' section", key))?;

    if let Value::Object(fields) = fields {
        for (field, value) in fields {
            target.insert(field, value);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pimcore::ClassDescriptor;

    const TEMPLATE: &str = r#"{
        "elasticsearch": {
            "host": "localhost:9200",
            "indexName": "vue_storefront_pimcore",
            "indexTypes": ["product", "category"]
        },
        "pimcore": {
            "url": "http://localhost/",
            "apiKey": "",
            "assetsPath": "/images",
            "rootCategoryId": 1,
            "locale": "en_GB",
            "productClass": {
                "name": "Product",
                "relatedObjects": ["images"]
            },
            "categoryClass": {
                "name": "ProductCategory",
                "urlKeyAttribute": "slug"
            }
        },
        "sync": {
            "batchSize": 500
        }
    }"#;

    fn sample_config() -> SetupConfig {
        SetupConfig {
            pimcore_url: "http://pimcore.local/".to_string(),
            api_key: "s3cret".to_string(),
            elasticsearch_url: "es.internal:9200/".to_string(),
            elasticsearch_index_name: "storefront".to_string(),
            root_category_id: 11,
            assets_path: "/var/assets".to_string(),
            locale: "de_DE".to_string(),
            product_class: "Product".to_string(),
            category_class: "ProductCategory".to_string(),
        }
    }

    fn sample_classes() -> Vec<ClassDescriptor> {
        serde_json::from_str(
            r#"[
                {"name": "Product", "id": 3, "relatedObjects": ["images", "variants"]},
                {"name": "ProductCategory", "id": 4}
            ]"#,
        )
        .unwrap()
    }

    fn write_template(dir: &std::path::Path) -> std::path::PathBuf {
        let template = dir.join("config.example.json");
        fs::write(&template, TEMPLATE).unwrap();
        template
    }

    #[test]
    fn test_overrides_and_preserves_template_keys() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let target = dir.path().join("config.json");

        create_config(&template, &target, &sample_config(), &sample_classes()).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written["elasticsearch"]["host"], "es.internal:9200/");
        assert_eq!(written["elasticsearch"]["indexName"], "storefront");
        assert_eq!(written["pimcore"]["url"], "http://pimcore.local/");
        assert_eq!(written["pimcore"]["apiKey"], "s3cret");
        assert_eq!(written["pimcore"]["rootCategoryId"], 11);
        assert_eq!(written["pimcore"]["locale"], "de_DE");

        // untouched template keys survive
        assert_eq!(
            written["elasticsearch"]["indexTypes"],
            serde_json::json!(["product", "category"])
        );
        assert_eq!(written["sync"]["batchSize"], 500);
    }

    #[test]
    fn test_class_definitions_are_merged_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let target = dir.path().join("config.json");

        create_config(&template, &target, &sample_config(), &sample_classes()).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        let product = &written["pimcore"]["productClass"];
        assert_eq!(product["name"], "Product");
        assert_eq!(product["id"], 3);
        assert_eq!(
            product["relatedObjects"],
            serde_json::json!(["images", "variants"])
        );

        // template-only key survives the merge
        let category = &written["pimcore"]["categoryClass"];
        assert_eq!(category["id"], 4);
        assert_eq!(category["urlKeyAttribute"], "slug");
    }

    #[test]
    fn test_missing_class_fails_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let target = dir.path().join("config.json");

        let mut config = sample_config();
        config.product_class = "Nonexistent".to_string();

        let err =
            create_config(&template, &target, &config, &sample_classes()).unwrap_err();
        assert_eq!(err.to_string(), "Can't create storefront config.");
    }

    #[test]
    fn test_missing_template_fails_the_write() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("does-not-exist.json");
        let target = dir.path().join("config.json");

        let err = create_config(&template, &target, &sample_config(), &sample_classes())
            .unwrap_err();
        assert_eq!(err.to_string(), "Can't create storefront config.");
    }

    #[test]
    fn test_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");

        create_config(&template, &first, &sample_config(), &sample_classes()).unwrap();
        create_config(&template, &second, &sample_config(), &sample_classes()).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }
}
