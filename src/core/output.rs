/// Appends `.png` unless `filename` already ends with it (any case).
pub fn ensure_png_extension(filename: &str) -> String {
    if filename.to_lowercase().ends_with(".png") {
        filename.to_string()
    } else {
        format!("{}.png", filename)
    }
}

/// Batch entries are always written as `<name>.png`.
pub fn batch_file_name(name: &str) -> String {
    format!("{}.png", name)
}

/// A manifest name must stay inside the images directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
