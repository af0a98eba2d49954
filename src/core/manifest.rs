//! Rendering [InstallOptions] into a Puppet manifest.

use crate::core::options::InstallOptions;
use std::fmt::Write;

/// A `class { 'opendaylight': ... }` declaration ready for one apply pass.
///
/// The text is built field by field, with every caller-supplied string quoted
/// as a Puppet single-quoted literal. Nothing the caller provides can change
/// the shape of the manifest, only parameter values. The artifact is immutable
/// once rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedManifest {
    /// The host this manifest was rendered for. Informational only; carried
    /// for logging and error messages.
    target: String,

    text: String,
}

impl RenderedManifest {
    /// Renders the manifest for `target` from fully resolved options.
    pub fn render(target: impl Into<String>, options: &InstallOptions) -> Self {
        let mut text = String::new();

        // write! to a String cannot fail.
        let _ = writeln!(text, "class {{ 'opendaylight':");
        let _ = writeln!(text, "  rpm_repo         => {},", quoted(&options.rpm_repo.to_string()));
        let _ = writeln!(text, "  deb_repo         => {},", quoted(&options.deb_repo.to_string()));
        let _ = writeln!(text, "  default_features => {},", array(&options.default_features));
        let _ = writeln!(text, "  extra_features   => {},", array(&options.extra_features));
        let _ = writeln!(text, "  odl_rest_port    => {},", options.odl_rest_port);
        let _ = writeln!(text, "  enable_ha        => {},", options.enable_ha);
        let _ = writeln!(text, "  ha_node_ips      => {},", array(&options.ha_node_ips));
        let _ = writeln!(text, "  ha_node_index    => {},", options.ha_node_index);
        let _ = writeln!(text, "  log_levels       => {},", hash(&options.log_levels));
        let _ = writeln!(text, "  username         => {},", quoted(&options.username));
        let _ = writeln!(text, "  password         => {},", quoted(&options.password));
        let _ = writeln!(text, "}}");

        RenderedManifest {
            target: target.into(),
            text,
        }
    }

    /// The host this manifest was rendered for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The manifest text to hand to the provisioning engine.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Quotes a string as a Puppet single-quoted literal.
///
/// Inside single quotes Puppet gives `\'` and `\\` special meaning and nothing
/// else, so escaping those two characters is sufficient.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn array(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| quoted(v)).collect();
    format!("[{}]", quoted.join(", "))
}

fn hash<'a>(pairs: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    let rendered: Vec<String> = pairs
        .into_iter()
        .map(|(key, value)| format!("{} => {}", quoted(key), quoted(value)))
        .collect();
    match rendered.is_empty() {
        true => "{}".to_string(),
        false => format!("{{ {} }}", rendered.join(", ")),
    }
}
