//! Database credentials from `wp-config.php`

use regex::Regex;

use super::commands::DbCredentials;
use crate::error::{CoreError, CoreResult};

fn define_value(content: &str, constant: &str) -> CoreResult<String> {
    let pattern = format!(r#"define\(\s*['"]{constant}['"]\s*,\s*['"](.+?)['"]\s*\)\s*;"#);
    let re = Regex::new(&pattern).map_err(|e| CoreError::Extraction(e.to_string()))?;
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CoreError::Extraction(format!("{constant} not found in wp-config.php")))
}

/// `DB_NAME`, `DB_USER` and `DB_PASSWORD`; all three are required.
pub fn extract_db_credentials(content: &str) -> CoreResult<DbCredentials> {
    Ok(DbCredentials {
        name: define_value(content, "DB_NAME")?,
        user: define_value(content, "DB_USER")?,
        password: define_value(content, "DB_PASSWORD")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WP_CONFIG: &str = r"<?php
/** The name of the database for WordPress */
define( 'DB_NAME', 'my_site_com' );

/** Database username */
define( 'DB_USER', 'my_site_com' );

/** Database password */
define( 'DB_PASSWORD', 'Xk2v9QpL0aZr7TgH1mNc5Ydw' );

define( 'DB_HOST', 'localhost' );
";

    #[test]
    fn extracts_all_three_values() {
        let creds = extract_db_credentials(WP_CONFIG).unwrap();
        assert_eq!(creds.name, "my_site_com");
        assert_eq!(creds.user, "my_site_com");
        assert_eq!(creds.password, "Xk2v9QpL0aZr7TgH1mNc5Ydw");
    }

    #[test]
    fn double_quotes_and_tight_spacing() {
        let content = r#"define("DB_NAME","a");define("DB_USER","b");define("DB_PASSWORD","c");"#;
        let creds = extract_db_credentials(content).unwrap();
        assert_eq!((creds.name.as_str(), creds.user.as_str()), ("a", "b"));
    }

    #[test]
    fn missing_password_is_an_extraction_error() {
        let content = WP_CONFIG.replace("DB_PASSWORD", "DB_PASS");
        assert!(matches!(
            extract_db_credentials(&content),
            Err(CoreError::Extraction(_))
        ));
    }
}
