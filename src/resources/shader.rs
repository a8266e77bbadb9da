//! Shader program loading, compilation and linking
//!
//! Each stage lives in its own WGSL file. Stages are parsed and validated with
//! naga before any pipeline is built, so a broken shader surfaces as a
//! [`QuadError`] instead of a device error. Linking checks the interface
//! between the two stages and the vertex layout feeding the first one.

use crate::backend::types::VertexBufferLayout;
use crate::error::{QuadError, QuadResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const VERTEX_ENTRY_POINT: &str = "vs_main";
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY_POINT,
            ShaderStage::Fragment => FRAGMENT_ENTRY_POINT,
        }
    }

    fn naga_stage(&self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// A compiled stage: its source plus the user-defined locations it reads and writes
#[derive(Debug, Clone)]
pub struct CompiledStage {
    pub stage: ShaderStage,
    pub path: PathBuf,
    pub source: String,
    pub inputs: BTreeSet<u32>,
    pub outputs: BTreeSet<u32>,
}

impl CompiledStage {
    /// Parse and validate WGSL source, then extract the entry point interface
    pub fn compile(stage: ShaderStage, path: &Path, source: String) -> QuadResult<Self> {
        let fail = |message: String| QuadError::ShaderCompilation {
            stage,
            path: path.to_path_buf(),
            message,
        };

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|e| fail(e.emit_to_string(&source)))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(&source)))?;

        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.name == stage.entry_point() && ep.stage == stage.naga_stage())
            .ok_or_else(|| fail(format!("missing entry point `{}`", stage.entry_point())))?;

        let mut inputs = BTreeSet::new();
        for arg in &entry.function.arguments {
            collect_locations(&module, arg.ty, arg.binding.as_ref(), &mut inputs);
        }

        let mut outputs = BTreeSet::new();
        if let Some(result) = &entry.function.result {
            collect_locations(&module, result.ty, result.binding.as_ref(), &mut outputs);
        }

        log::debug!(
            "Compiled {:?} stage {}: inputs {:?}, outputs {:?}",
            stage,
            path.display(),
            inputs,
            outputs
        );

        Ok(Self {
            stage,
            path: path.to_path_buf(),
            source,
            inputs,
            outputs,
        })
    }

    /// Read a stage from disk and compile it
    pub fn from_file(stage: ShaderStage, path: &Path) -> QuadResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| QuadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::compile(stage, path, source)
    }
}

/// Locations of a binding, or of every member when the binding is a struct
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.insert(*location);
                    }
                }
            }
        }
    }
}

/// A linked vertex + fragment pair
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub vertex: CompiledStage,
    pub fragment: CompiledStage,
}

impl ShaderProgram {
    /// Load, compile and link both stages from files
    pub fn from_files(
        vertex_path: &Path,
        fragment_path: &Path,
        layout: &VertexBufferLayout,
    ) -> QuadResult<Self> {
        let vertex = CompiledStage::from_file(ShaderStage::Vertex, vertex_path)?;
        let fragment = CompiledStage::from_file(ShaderStage::Fragment, fragment_path)?;
        Self::link(vertex, fragment, layout)
    }

    /// Compile and link in-memory sources.
    ///
    /// For shaders that are embedded or generated rather than read from disk;
    /// errors name the stage as `<vertex>` or `<fragment>` instead of a path.
    pub fn from_sources(
        vertex_source: &str,
        fragment_source: &str,
        layout: &VertexBufferLayout,
    ) -> QuadResult<Self> {
        let vertex = CompiledStage::compile(
            ShaderStage::Vertex,
            Path::new("<vertex>"),
            vertex_source.to_string(),
        )?;
        let fragment = CompiledStage::compile(
            ShaderStage::Fragment,
            Path::new("<fragment>"),
            fragment_source.to_string(),
        )?;
        Self::link(vertex, fragment, layout)
    }

    /// Check that the stages agree with each other and with the vertex layout
    pub fn link(
        vertex: CompiledStage,
        fragment: CompiledStage,
        layout: &VertexBufferLayout,
    ) -> QuadResult<Self> {
        if let Some(missing) = vertex.inputs.iter().find(|&&loc| !layout.provides(loc)) {
            return Err(QuadError::ShaderLink(format!(
                "vertex input @location({missing}) has no matching vertex attribute"
            )));
        }

        if let Some(missing) = fragment.inputs.difference(&vertex.outputs).next() {
            return Err(QuadError::ShaderLink(format!(
                "fragment input @location({missing}) is not written by the vertex stage"
            )));
        }

        log::info!(
            "Linked shader program ({} + {})",
            vertex.path.display(),
            fragment.path.display()
        );

        Ok(Self { vertex, fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::Vertex;

    const VERTEX: &str = include_str!("../../shaders/quad.vert.wgsl");
    const FRAGMENT: &str = include_str!("../../shaders/quad.frag.wgsl");

    #[test]
    fn bundled_shaders_link() {
        let program = ShaderProgram::from_sources(VERTEX, FRAGMENT, &Vertex::layout()).unwrap();
        assert_eq!(program.vertex.inputs, BTreeSet::from([0, 1, 2]));
        assert_eq!(program.vertex.outputs, BTreeSet::from([0, 1]));
        assert_eq!(program.fragment.inputs, BTreeSet::from([1]));
    }

    #[test]
    fn syntax_error_is_compilation_failure() {
        let err = ShaderProgram::from_sources("fn vs_main( {", FRAGMENT, &Vertex::layout())
            .unwrap_err();
        assert!(matches!(
            err,
            QuadError::ShaderCompilation { stage: ShaderStage::Vertex, .. }
        ));
    }

    #[test]
    fn wrong_entry_point_is_compilation_failure() {
        let fragment = FRAGMENT.replace("fs_main", "main");
        let err = ShaderProgram::from_sources(VERTEX, &fragment, &Vertex::layout()).unwrap_err();
        match err {
            QuadError::ShaderCompilation { stage, message, .. } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(message.contains("fs_main"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unmatched_fragment_input_fails_link() {
        let fragment = FRAGMENT.replace("@location(1) tex_coord", "@location(5) tex_coord");
        let err = ShaderProgram::from_sources(VERTEX, &fragment, &Vertex::layout()).unwrap_err();
        assert!(matches!(err, QuadError::ShaderLink(msg) if msg.contains("@location(5)")));
    }

    #[test]
    fn vertex_input_outside_layout_fails_link() {
        let vertex = VERTEX.replace("@location(2) tex_coord", "@location(7) tex_coord");
        let err = ShaderProgram::from_sources(&vertex, FRAGMENT, &Vertex::layout()).unwrap_err();
        assert!(matches!(err, QuadError::ShaderLink(msg) if msg.contains("@location(7)")));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ShaderProgram::from_files(
            Path::new("no/such/vertex.wgsl"),
            Path::new("no/such/fragment.wgsl"),
            &Vertex::layout(),
        )
        .unwrap_err();
        assert!(matches!(err, QuadError::Io { .. }));
    }
}
