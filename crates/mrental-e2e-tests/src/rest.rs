use anyhow::Result;
use mrental_dal::{genre::Genre, movie::Movie, rental::Rental};
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Genre> {
    let payload = json!({"name": name});
    let api_url = base_url.join("api/v1/generos")?;

    let response = client.post(api_url).json(&payload).send().await?;
    assert_eq!(response.status().as_u16(), 201);

    let new_genre: Genre = response.json().await?;
    Ok(new_genre)
}

pub async fn create_movie(
    client: &reqwest::Client,
    base_url: &Url,
    name: &str,
    genre_id: i64,
) -> Result<Movie> {
    let payload = json!({"name": name, "genre_id": genre_id});
    let api_url = base_url.join("api/v1/filmes")?;

    let response = client.post(api_url).json(&payload).send().await?;
    assert_eq!(response.status().as_u16(), 201);

    let new_movie: Movie = response.json().await?;
    Ok(new_movie)
}

pub async fn create_rental(
    client: &reqwest::Client,
    base_url: &Url,
    customer_tax_id: &str,
    movie_ids: &[i64],
) -> Result<Rental> {
    let movies: Vec<_> = movie_ids.iter().map(|id| json!({"id": id})).collect();
    let payload = json!({"customer_tax_id": customer_tax_id, "movies": movies});
    let api_url = base_url.join("api/v1/locacoes")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Rental response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 201);

    let new_rental: Rental = response.json().await?;
    Ok(new_rental)
}
