//! User-visible strings with explicit locale fallback.

/// String table for one locale. Parametrized messages are templates with
/// `{placeholder}` fields.
pub struct Localization {
    pub save_and_close: &'static str,
    pub close: &'static str,
    pub discard_changes: &'static str,
    pub default_image_title: &'static str,
    pub no_autosave: &'static str,
    not_saved_template: &'static str,
    invalid_resource_template: &'static str,
    not_editable_template: &'static str,
}

impl Localization {
    #[must_use]
    pub fn not_saved(&self, error: &str) -> String {
        self.not_saved_template.replace("{error}", error)
    }

    #[must_use]
    pub fn invalid_resource(&self, reference: &str) -> String {
        self.invalid_resource_template.replace("{reference}", reference)
    }

    #[must_use]
    pub fn not_editable(&self, reference: &str, mime: &str) -> String {
        self.not_editable_template
            .replace("{reference}", reference)
            .replace("{mime}", mime)
    }
}

const EN: Localization = Localization {
    save_and_close: "Save and close",
    close: "Close",
    discard_changes: "Discard changes",
    default_image_title: "Drawing",
    no_autosave: "No autosaved drawing exists.",
    not_saved_template: "Not saved: {error}",
    invalid_resource_template: "{reference} does not name an existing drawing.",
    not_editable_template: "{reference} is not an editable image. Its mime type is {mime}.",
};

const ES: Localization = Localization {
    save_and_close: "Guardar y cerrar",
    close: "Cerrar",
    discard_changes: "Descartar cambios",
    default_image_title: "Dibujo",
    no_autosave: "No existe un dibujo guardado automáticamente.",
    not_saved_template: "No guardado: {error}",
    invalid_resource_template: "{reference} no corresponde a un dibujo existente.",
    not_editable_template: "{reference} no es una imagen editable. Su tipo mime es {mime}.",
};

const TABLE: &[(&str, &Localization)] = &[("en", &EN), ("es", &ES)];

/// Pick a string table from an ordered list of candidate locale tags.
///
/// The first candidate whose primary subtag matches a table entry wins;
/// English is the fallback.
#[must_use]
pub fn for_locales<'a>(candidates: impl IntoIterator<Item = &'a str>) -> &'static Localization {
    for tag in candidates {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or(tag)
            .to_ascii_lowercase();
        if let Some((_, table)) = TABLE.iter().find(|(name, _)| *name == primary) {
            return table;
        }
    }
    &EN
}

/// The default (English) table.
#[must_use]
pub fn default_locale() -> &'static Localization {
    &EN
}
