//! `httpClient`: a preconfigured axios instance with cookie auth.

use graft_core::domain::{
    ConfigContext, DomainError, FileContent, FileSpec, FileType, PackageSpec, PluginDescriptor,
    PluginId, ProjectKind,
};

pub const ID: &str = "httpClient";

/// `.env` with the API base URL under the kind's public prefix.
pub(crate) fn env_file() -> FileSpec {
    FileSpec::new(
        ".env",
        FileType::Plain,
        FileContent::parameterized("{{ENV_PREFIX}}BASE_URL=https://jsonplaceholder.typicode.com/"),
    )
}

/// `src/utils/api.{ts,js}`.
pub(crate) fn api_file() -> FileSpec {
    FileSpec::new("api", FileType::Native, FileContent::dynamic(api_module)).at(["src", "utils"])
}

pub(crate) fn api_packages() -> [PackageSpec; 2] {
    [PackageSpec::runtime("axios"), PackageSpec::runtime("js-cookie")]
}

pub(crate) fn cookie_types(ctx: &ConfigContext) -> Vec<PackageSpec> {
    if ctx.uses_static_typing() {
        vec![PackageSpec::dev("@types/js-cookie")]
    } else {
        Vec::new()
    }
}

pub fn plugin() -> Result<PluginDescriptor, DomainError> {
    let [axios, cookies] = api_packages();
    PluginDescriptor::builder(PluginId::new(ID))
        .name("HTTP client")
        .description("Axios instance with token interceptors and a typed posts API")
        .initializing_message("Adding axios client, Please wait !")
        .tag("http")
        .supports_all()
        .file(env_file())
        .file(api_file())
        .package(axios)
        .package(cookies)
        .dependencies(cookie_types)
        .build()
}

fn api_module(ctx: &ConfigContext) -> String {
    let typed = ctx.uses_static_typing();
    let kind = ctx.project_kind();

    let (environment, base_url) = match kind {
        ProjectKind::ReactVite => (
            "const environment = import.meta.env;\n",
            format!("environment.{}BASE_URL", kind.env_prefix()),
        ),
        ProjectKind::NextApp | ProjectKind::ReactCra => ("", kind.env_expression("BASE_URL")),
    };

    let post_type = if typed {
        "type PostType = {\n  userId: number;\n  id: number;\n  title: string;\n  body: string;\n};\n\n"
    } else {
        ""
    };
    let posts_generic = if typed { "<PostType[]>" } else { "" };
    let create_body = if typed {
        ": { heading: string; content: string }"
    } else {
        ""
    };
    let upload_body = if typed {
        ": {\n  useUniqueFileName: boolean;\n  file: string;\n  publicKey: string;\n  fileName: string;\n}"
    } else {
        ""
    };
    let upload_generic = if typed {
        "<{\n    fileId: string;\n    name: string;\n    url: string;\n  }>"
    } else {
        ""
    };

    format!(
        r#"import axios from "axios";
import Cookies from "js-cookie";

{environment}export const API = axios.create({{
  baseURL: {base_url},
  withCredentials: true,
}});

// Exchange the refresh token for a new access token here.
const refreshToken = async () => {{}};

API.interceptors.request.use(
  config => {{
    const accessToken = Cookies.get("accessToken");

    if (accessToken) {{
      config.headers["Authorization"] = `Bearer ${{accessToken}}`;
    }}

    return config;
  }},
  error => Promise.reject(error)
);

API.interceptors.response.use(
  response => response,
  async error => {{
    if (error.response && error.response.status === 401) {{
      const newAccessToken = await refreshToken();
      const originalRequest = error.config;
      originalRequest.headers["Authorization"] = `Bearer ${{newAccessToken}}`;
      return axios(originalRequest);
    }}

    return Promise.reject(error);
  }}
);

{post_type}export const getPosts = async () =>
  API.get{posts_generic}("/posts").then(res => res.data);

export const createPost = (body{create_body}) =>
  API.post("/item/create", body);

// Multipart upload, e.g. images or video.
export const imageKitUpload = (body{upload_body}) =>
  axios.post{upload_generic}("APP_IMAGEKIT_UPLOAD_URL_ENDPOINT", body, {{
    headers: {{ "Content-Type": "multipart/form-data" }},
  }});
"#
    )
}
