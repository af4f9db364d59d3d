use clap::Parser;

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(env, long)]
    pub environment: String,

    #[clap(env, long)]
    pub database_url: String,

    /// Comma separated list of allowed origins, `*` allows any.
    #[clap(env, long, default_value = "*")]
    pub origin_urls: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    #[clap(env, long, default_value = "https://nominatim.openstreetmap.org/search")]
    pub nominatim_url: String,

    #[clap(env, long, default_value = "https://overpass-api.de/api/interpreter")]
    pub overpass_url: String,

    #[clap(env, long, default_value_t = 8)]
    pub max_db_connections: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_osm_services() {
        let config = Config::parse_from([
            "freshbite-discovery",
            "--environment", "test",
            "--database-url", "postgres://localhost/freshbite",
        ]);

        assert_eq!(config.nominatim_url, "https://nominatim.openstreetmap.org/search");
        assert_eq!(config.overpass_url, "https://overpass-api.de/api/interpreter");
    }
}
