use super::LogFormat;

pub(super) fn log_level() -> String {
    "sandgraph_engine=info".to_string()
}

pub(super) fn log_format() -> LogFormat {
    LogFormat::Pretty
}

pub(super) fn has_image_edge_label() -> String {
    "entityHasImage".to_string()
}

pub(super) fn glyph_icon_property_name() -> String {
    "glyphIconVertexId".to_string()
}

pub(super) fn row_key_property_name() -> String {
    "rowKey".to_string()
}

pub(super) fn max_cascade_properties() -> usize {
    1024
}
