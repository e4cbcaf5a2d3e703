// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

use crate::middleware::i18n::Locale;

pub const DEFAULT_LANG: &str = "pt";

// Os pacotes de mensagens vão embutidos no binário
const BUNDLES: [(&str, &str); 2] = [
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens de erro traduzidas, indexadas por idioma e chave.
#[derive(Debug, Default)]
pub struct I18nStore {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, raw) in BUNDLES {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Pacote de idioma '{}' inválido", lang))?;
            bundles.insert(lang.to_string(), messages);
        }
        Ok(Self { bundles })
    }

    /// Busca a mensagem no idioma pedido, cai para o português e, por fim, na própria chave.
    pub fn translate(&self, locale: &Locale, key: &str) -> String {
        self.lookup(&locale.0, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Igual ao `translate`, trocando `{param}` pelo valor.
    pub fn translate_with(&self, locale: &Locale, key: &str, params: &[(&str, String)]) -> String {
        params.iter().fold(self.translate(locale, key), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.bundles.get(lang)?.get(key).map(String::as_str)
    }
}
