use kontak_client::{KontakApi, ProfileTransport};
use kontak_server_domain::render::{BANNED_NOTICE, PublicProfileView};

/// Fetches a profile by unique code and prints its public view, with the
/// same placeholder suppression the web renderer applies.
#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: kontak-client <base_url> <unique_code>");
        std::process::exit(1);
    }

    let api = KontakApi::new(&args[1]);
    let profile = match api.get_public_profile(&args[2]).await {
        Ok(profile) => profile,
        Err(e) => {
            eprintln!("Failed to fetch profile: {}", e);
            std::process::exit(1);
        }
    };

    let view = PublicProfileView::of(&profile);

    if view.banned {
        println!("!! {}", BANNED_NOTICE);
    }
    println!("{}", view.full_name);
    println!("{} at {}", view.job_title, view.company_name);
    if let Some(location) = &view.location {
        println!("{}", location);
    }
    println!();
    println!("About: {}", view.about_text);

    for (label, value) in [
        ("Email", &view.email),
        ("Mobile", &view.mobile_primary),
        ("Landline", &view.landline_number),
        ("Address", &view.address),
    ] {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }

    if let Some(photo) = &view.profile_photo {
        println!("Photo: {}", api.to_server_file_url(photo));
    }

    if !view.socials.is_empty() {
        println!();
        for link in &view.socials {
            println!("{}: {}", link.kind.label(), link.url);
        }
    }
}
