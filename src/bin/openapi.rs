//! Writes the OpenAPI YAML document to `docs/openapi.yml`.

fn main() {
    match shop_auth::openapi::openapi_yaml_write_default() {
        Ok(path) => println!("wrote {}", path.display()),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
