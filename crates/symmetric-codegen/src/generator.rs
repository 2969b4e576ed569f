//! Rendering classes into named source files

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use symmetric_template::{FilterRegistry, Template};
use tracing::{debug, warn};

use crate::{
    config::CodegenConfig,
    error::{GenerationError, Result},
    schema::ClassSchema,
};

/// A rendered output file, not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// `{prefix}{ClassName}.{extension}`
    pub path: PathBuf,
    /// Name of the template that produced the file
    pub template: String,
    /// Class the file was rendered for
    pub class_name: String,
    /// Rendered and re-indented content
    pub content: String,
}

/// A compiled template and the extension of the files it produces
#[derive(Debug, Clone)]
struct OutputTemplate {
    name: String,
    extension: String,
    template: Template,
}

/// Renders every registered template for each class
///
/// Templates are compiled once in [`Generator::add_template`] and reused for
/// every class. The generator never writes files.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: CodegenConfig,
    templates: Vec<OutputTemplate>,
    filters: Option<FilterRegistry>,
}

impl Generator {
    /// Create a generator with no templates
    pub fn new(config: CodegenConfig) -> Self {
        Self {
            config,
            templates: Vec::new(),
            filters: None,
        }
    }

    /// Render with `filters` instead of the process-wide registry
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    /// Compile and register a template
    ///
    /// # Arguments
    /// * `name` - Name used in errors and in [`GeneratedFile::template`]
    /// * `extension` - Output file extension, with or without the leading dot
    /// * `source` - Template text
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        extension: impl Into<String>,
        source: &str,
    ) -> Result<&mut Self> {
        let name = name.into();
        let template = Template::compile(source).map_err(|source| GenerationError::Compile {
            template: name.clone(),
            source,
        })?;

        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        debug!(template = %name, extension = %extension, "registered template");

        self.templates.push(OutputTemplate {
            name,
            extension,
            template,
        });
        Ok(self)
    }

    /// Names of the registered templates, in registration order
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    /// Output path for one class and extension
    pub fn output_path(&self, class_name: &str, extension: &str) -> PathBuf {
        PathBuf::from(format!("{}{}.{}", self.config.prefix, class_name, extension))
    }

    /// Replace each tab with `indent` spaces, or keep tabs when `indent` is 0
    pub fn post_render(&self, output: String) -> String {
        if self.config.indent == 0 {
            return output;
        }
        output.replace('\t', &" ".repeat(self.config.indent))
    }

    /// Render every template for one class
    ///
    /// Fails without returning any file if one template fails.
    pub fn render_class(&self, schema: &ClassSchema) -> Result<Vec<GeneratedFile>> {
        let context = schema.to_context(&self.config)?;

        self.templates
            .iter()
            .map(|output| {
                let rendered = match &self.filters {
                    Some(filters) => output.template.render_with(&context, filters),
                    None => output.template.render(&context),
                }
                .map_err(|source| GenerationError::Render {
                    template: output.name.clone(),
                    class_name: schema.name.clone(),
                    source,
                })?;

                let path = self.output_path(&schema.name, &output.extension);
                debug!(
                    path = %path.display(),
                    template = %output.name,
                    class = %schema.name,
                    "rendered file"
                );

                Ok(GeneratedFile {
                    path,
                    template: output.name.clone(),
                    class_name: schema.name.clone(),
                    content: self.post_render(rendered),
                })
            })
            .collect()
    }

    /// Render every template for every class not excluded by the configuration
    pub fn generate(&self, classes: &[ClassSchema]) -> Result<Vec<GeneratedFile>> {
        for excluded in &self.config.exclude {
            if !classes.iter().any(|class| &class.name == excluded) {
                warn!(class = %excluded, "excluded class not found");
            }
        }

        let mut files = Vec::with_capacity(classes.len() * self.templates.len());
        for class in classes {
            if self.config.is_excluded(&class.name) {
                debug!(class = %class.name, "skipping excluded class");
                continue;
            }
            files.extend(self.render_class(class)?);
        }
        Ok(files)
    }
}
