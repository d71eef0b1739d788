fn main() {
    maxchat::config::load_dotenv();
    dioxus::launch(maxchat::ui::App);
}
