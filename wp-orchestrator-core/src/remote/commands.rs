//! 远程命令构建

use crate::types::WorkflowSettings;

/// Quote a value for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote a value as a MySQL string literal.
pub fn sql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}

/// Quote a MySQL identifier with backticks.
pub fn sql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a value as a PHP single-quoted string.
pub fn php_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', r"\\").replace('\'', r"\'"))
}

/// `mysql -e '<sql>'`
pub fn mysql(sql: &str) -> String {
    format!("mysql -e {}", shell_quote(sql))
}

/// WP-CLI invocations bound to one site.
pub struct WpCli {
    bin: String,
    path: String,
}

impl WpCli {
    pub fn new(settings: &WorkflowSettings, domain: &str) -> Self {
        Self {
            bin: settings.wp_cli.clone(),
            path: settings.site_root(domain),
        }
    }

    /// `wp <args> --path=<site root> --allow-root`
    pub fn cmd(&self, args: &str) -> String {
        format!(
            "{} {args} --path={} --allow-root",
            self.bin,
            shell_quote(&self.path)
        )
    }

    pub fn site_root(&self) -> &str {
        &self.path
    }
}

/// Database name, user and password of one site.
#[derive(Clone, PartialEq, Eq)]
pub struct DbCredentials {
    pub name: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"****")
            .finish()
    }
}

impl DbCredentials {
    /// Create the database and a local user owning it.
    pub fn create_commands(&self) -> Vec<String> {
        vec![
            mysql(&format!("CREATE DATABASE {};", sql_ident(&self.name))),
            mysql(&format!(
                "CREATE USER {}@'localhost' IDENTIFIED BY {};",
                sql_quote(&self.user),
                sql_quote(&self.password)
            )),
            mysql(&format!(
                "GRANT ALL PRIVILEGES ON {}.* TO {}@'localhost';",
                sql_ident(&self.name),
                sql_quote(&self.user)
            )),
            mysql("FLUSH PRIVILEGES;"),
        ]
    }

    /// `mysqldump <name> > <path>`
    pub fn dump_command(&self, path: &str) -> String {
        format!("mysqldump {} > {}", shell_quote(&self.name), shell_quote(path))
    }

    /// `mysql <name> < <path>`
    pub fn restore_command(&self, path: &str) -> String {
        format!("mysql {} < {}", shell_quote(&self.name), shell_quote(path))
    }
}

/// Drop a site's user and database; both may already be gone.
pub fn drop_database_commands(name: &str, user: &str) -> Vec<String> {
    vec![
        mysql(&format!("DROP USER IF EXISTS {}@'localhost';", sql_quote(user))),
        mysql(&format!("DROP DATABASE IF EXISTS {};", sql_ident(name))),
    ]
}

/// Repository and package for the ACME client.
pub fn certbot_install_commands() -> Vec<String> {
    vec![
        "dnf install -y -q epel-release --nogpgcheck".to_string(),
        "dnf install -y -q certbot python3-certbot-apache --nogpgcheck".to_string(),
    ]
}

/// Download WP-CLI and move it to the configured path.
pub fn wp_cli_install_commands(settings: &WorkflowSettings) -> Vec<String> {
    vec![
        "curl -sSO https://raw.githubusercontent.com/wp-cli/builds/gh-pages/phar/wp-cli.phar"
            .to_string(),
        "php wp-cli.phar --info >/dev/null".to_string(),
        "chmod +x wp-cli.phar".to_string(),
        format!("mv wp-cli.phar {}", shell_quote(&settings.wp_cli)),
    ]
}

/// Web server, firewall, database and PHP, in install order. Safe to re-run.
pub fn base_stack_commands() -> Vec<String> {
    [
        "dnf update -y -q",
        "setenforce 0",
        "dnf install -y -q wget",
        "dnf install -y -q httpd httpd-tools",
        "systemctl start httpd",
        "systemctl enable httpd",
        "dnf install -y -q firewalld",
        "systemctl start firewalld",
        "systemctl enable firewalld",
        "firewall-cmd --permanent --add-service=http",
        "firewall-cmd --permanent --add-port=61208/tcp",
        "systemctl reload firewalld",
        "dnf install -y -q mysql-server",
        "systemctl start mysqld",
        "systemctl enable mysqld",
    ]
    .into_iter()
    .map(str::to_string)
    .chain([
        mysql("DELETE FROM mysql.user WHERE User='';"),
        mysql("DROP DATABASE IF EXISTS test;"),
        mysql(r"DELETE FROM mysql.db WHERE Db='test' OR Db='test\_%';"),
        mysql("FLUSH PRIVILEGES;"),
        "dnf install -y -q php php-mysqlnd php-cli php-curl php-gd php-xml php-mbstring"
            .to_string(),
        "systemctl restart httpd".to_string(),
    ])
    .collect()
}

/// Monitoring agent; its unit file is uploaded between install and enable.
pub const GLANCES_INSTALL: &str = "dnf install -y -q glances";
pub const GLANCES_UNIT_PATH: &str = "/etc/systemd/system/glances.service";
pub const GLANCES_ENABLE: &[&str] = &[
    "systemctl daemon-reload",
    "systemctl enable glances.service",
    "systemctl start glances.service",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn sql_and_php_quote() {
        assert_eq!(sql_quote(r"a'b\c"), r"'a\'b\\c'");
        assert_eq!(php_quote("Don't wait"), r"'Don\'t wait'");
    }

    #[test]
    fn wp_cli_targets_site_root() {
        let wp = WpCli::new(&WorkflowSettings::default(), "my-site.com");
        assert_eq!(
            wp.cmd("theme install astra --activate"),
            "/usr/local/bin/wp theme install astra --activate --path='/var/www/my-site.com' --allow-root"
        );
    }

    #[test]
    fn create_commands_quote_password() {
        let creds = DbCredentials {
            name: "my_site_com".to_string(),
            user: "my_site_com".to_string(),
            password: "pa'ss".to_string(),
        };
        let commands = creds.create_commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], "mysql -e 'CREATE DATABASE `my_site_com`;'");
        assert!(commands[1].contains(r"IDENTIFIED BY '\''pa\'\''ss'\''"));
        assert!(!format!("{creds:?}").contains("pa'ss"));
    }

    #[test]
    fn dump_and_restore_quote_the_database_name() {
        let creds = DbCredentials {
            name: "a_com$(reboot)".to_string(),
            user: "a_com".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(
            creds.dump_command("/tmp/a_com.sql"),
            "mysqldump 'a_com$(reboot)' > '/tmp/a_com.sql'"
        );
        assert_eq!(
            creds.restore_command("/tmp/a_com.sql"),
            "mysql 'a_com$(reboot)' < '/tmp/a_com.sql'"
        );
        assert_eq!(sql_ident("a`b"), "`a``b`");
    }

    #[test]
    fn wp_cli_lands_on_configured_path() {
        let settings = WorkflowSettings {
            wp_cli: "/opt/bin/wp".to_string(),
            ..WorkflowSettings::default()
        };
        let commands = wp_cli_install_commands(&settings);
        assert_eq!(commands.last().unwrap(), "mv wp-cli.phar '/opt/bin/wp'");
    }
}
