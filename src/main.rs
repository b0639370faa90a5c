#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tutoring_backend::run().await;
}
