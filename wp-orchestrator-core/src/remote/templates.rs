//! Files written to the managed hosts

use super::commands::php_quote;
use crate::types::WorkflowSettings;

/// First line of the contact form block in the theme's `functions.php`.
pub const FORM_BLOCK_BEGIN: &str = "// BEGIN wp-orchestrator contact form";
/// Last line of the contact form block.
pub const FORM_BLOCK_END: &str = "// END wp-orchestrator contact form";

/// Rewrite rules plus deny rules for the config files.
pub const HTACCESS: &str = r"# BEGIN WordPress
<IfModule mod_rewrite.c>
RewriteEngine On
RewriteBase /
RewriteRule ^index\.php$ - [L]
RewriteCond %{REQUEST_FILENAME} !-f
RewriteCond %{REQUEST_FILENAME} !-d
RewriteRule . /index.php [L]
</IfModule>
# END WordPress

<Files wp-config.php>
order allow,deny
deny from all
</Files>

<Files .htaccess>
order allow,deny
deny from all
</Files>
";

/// systemd unit serving the monitoring agent's web UI.
pub const GLANCES_UNIT: &str = "[Unit]
Description=Glances in Web Server Mode
After=network.target

[Service]
ExecStart=/usr/bin/glances -w --bind 0.0.0.0
Restart=on-failure

[Install]
WantedBy=multi-user.target
";

/// Port-80 virtual host.
pub fn http_vhost(settings: &WorkflowSettings, domain: &str) -> String {
    let root = settings.site_root(domain);
    format!(
        r#"<VirtualHost *:80>
    ServerName {domain}
    DocumentRoot {root}

    ErrorLog /var/log/httpd/{domain}_error.log
    CustomLog /var/log/httpd/{domain}_access.log combined

    <Directory {root}>
        AllowOverride All
        Require all granted
    </Directory>

    Header set Access-Control-Allow-Origin "*"
    Header set Access-Control-Allow-Methods "GET, POST, OPTIONS"
    Header set Access-Control-Allow-Headers "Content-Type"
</VirtualHost>
"#
    )
}

/// Port-443 virtual host using the certbot-issued certificate.
pub fn ssl_vhost(settings: &WorkflowSettings, domain: &str) -> String {
    let root = settings.site_root(domain);
    format!(
        r"<VirtualHost *:443>
    ServerName {domain}
    DocumentRoot {root}

    SSLEngine on
    SSLCertificateFile /etc/letsencrypt/live/{domain}/fullchain.pem
    SSLCertificateKeyFile /etc/letsencrypt/live/{domain}/privkey.pem

    <Directory {root}>
        Options Indexes FollowSymLinks
        AllowOverride All
        Require all granted
    </Directory>

    ErrorLog /var/log/httpd/{domain}_error.log
    CustomLog /var/log/httpd/{domain}_access.log combined
</VirtualHost>
"
    )
}

/// Body of the generated "About Us" page.
pub fn about_page(domain: &str, address: Option<&str>, phone: &str) -> String {
    let mut html = String::from("<h3>Contact Us</h3>\n");
    if let Some(address) = address {
        html.push_str(&format!("<p><strong>Address:</strong> {address}</p>\n"));
    }
    html.push_str(&format!("<p><strong>Phone:</strong> {phone}</p>\n"));
    html.push_str(&format!("<p><strong>Email:</strong> info@{domain}</p>\n"));
    html
}

/// Content filter that prepends the newest Contact Form 7 form to single
/// posts, pages and the front page. Wrapped in begin/end markers.
pub fn contact_form_block(form_title: &str) -> String {
    let title = php_quote(form_title);
    format!(
        r#"{FORM_BLOCK_BEGIN}
function wpo_add_contact_form_to_content($content) {{
    $form_query = new WP_Query(array(
        'post_type'      => 'wpcf7_contact_form',
        'posts_per_page' => 1,
        'order'          => 'DESC'
    ));

    if (!$form_query->have_posts()) {{
        return $content;
    }}
    $form_query->the_post();
    $form_id = get_the_ID();
    wp_reset_postdata();

    $form_title = {title};
    $shortcode = '[contact-form-7 id="' . $form_id . '" title="' . esc_attr($form_title) . '"]';

    if (is_single() || is_page() || is_front_page()) {{
        $content = '
            <section id="contact-form">
                <h2 style="text-align: center;">' . esc_html($form_title) . '</h2>
                <div>' . do_shortcode($shortcode) . '</div>
            </section>' . $content;
    }}

    return $content;
}}
add_filter('the_content', 'wpo_add_contact_form_to_content');
{FORM_BLOCK_END}
"#
    )
}

/// Replace the marked block in `existing`, or append it if there is none.
///
/// Applying the same block twice yields the same file.
pub fn upsert_marked_block(existing: &str, block: &str) -> String {
    if let Some(start) = existing.find(FORM_BLOCK_BEGIN) {
        if let Some(end_rel) = existing[start..].find(FORM_BLOCK_END) {
            let mut end = start + end_rel + FORM_BLOCK_END.len();
            if existing[end..].starts_with('\n') {
                end += 1;
            }
            let mut patched = String::with_capacity(existing.len() + block.len());
            patched.push_str(&existing[..start]);
            patched.push_str(block);
            patched.push_str(&existing[end..]);
            return patched;
        }
    }

    let mut patched = existing.to_string();
    if !patched.is_empty() && !patched.ends_with('\n') {
        patched.push('\n');
    }
    patched.push('\n');
    patched.push_str(block);
    patched
}
