//! Placeholder HTML pages for the guarded routes

use axum::response::Html;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - NoteHub</title>
</head>
<body>
    <main>
        <h1>{title}</h1>
        {body}
    </main>
</body>
</html>"#
    ))
}

pub async fn home() -> Html<String> {
    page("NoteHub", r#"<p><a href="/notes">Your notes</a> · <a href="/profile">Profile</a></p>"#)
}

pub async fn sign_in() -> Html<String> {
    page("Sign in", r#"<p>No account yet? <a href="/sign-up">Sign up</a></p>"#)
}

pub async fn sign_up() -> Html<String> {
    page("Sign up", r#"<p>Already registered? <a href="/sign-in">Sign in</a></p>"#)
}

pub async fn profile() -> Html<String> {
    page("Profile", r#"<p><a href="/notes">Back to notes</a></p>"#)
}
