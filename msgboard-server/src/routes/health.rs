pub async fn get_health() -> &'static str {
    "OK"
}
