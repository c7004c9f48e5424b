/// The about page. Presentation only; no gateway involved.
pub fn run() {
    println!("quill - a small blogging client");
    println!();
    println!("Posts, comments, and accounts live in a hosted data gateway;");
    println!("this tool is a thin client over it. Browse without an account,");
    println!("register to write.");
    println!();
    println!("  quill list                 the latest posts");
    println!("  quill show <id>            read one, with its comments");
    println!("  quill register / login     get a session");
    println!("  quill new --title <t>      publish something");
    println!("  quill doctor               check the gateway setup");
}
