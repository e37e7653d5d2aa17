//! Browser upload form.

use axum::response::Html;

const UPLOAD_FORM: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>rendersort</title></head>
<body>
<h2>Upload Folder (PNG files)</h2>
<form action="/process_directory" method="POST" enctype="multipart/form-data">
    <input type="file" name="files" webkitdirectory multiple required>
    <br><br>
    <button type="submit">Upload &amp; Process</button>
</form>
<h2>Upload Zip Archive</h2>
<form action="/process_archive" method="POST" enctype="multipart/form-data">
    <input type="file" name="archive" accept=".zip,application/zip" required>
    <br><br>
    <button type="submit">Upload &amp; Process</button>
</form>
</body>
</html>
"#;

pub(crate) async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
