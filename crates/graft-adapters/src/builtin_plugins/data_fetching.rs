//! `dataFetching`: React Query wired into the Next.js app router.
//!
//! Adds a query client, a hydration boundary, a `Providers` component that
//! wraps the root layout, and a server-rendered `/posts` example page built
//! on the `httpClient` api module.

use graft_core::domain::{
    ConfigContext, DomainError, FileContent, FileSpec, FileType, LogicalFileAlias,
    ModificationSpec, PackageSpec, PluginDescriptor, PluginId, ProjectKind,
};

use super::http_client;

pub const ID: &str = "dataFetching";

const QUERY_CLIENT_OPTIONS: &str = r#"export const queryClientOptions = {
  defaultOptions: {
    queries: {
      refetchOnWindowFocus: false,
    },
  },
};
"#;

const GET_QUERY_CLIENT: &str = r#"import { QueryClient } from "@tanstack/react-query";
import { cache } from "react";
import { queryClientOptions } from "./queryClientOptions";

const getQueryClient = cache(() => new QueryClient(queryClientOptions));
export default getQueryClient;
"#;

const POSTS_PAGE: &str = r#"import { ReactQueryHydrate } from "@/components/ReactQueryHydrate/ReactQueryHydrate";
import { Posts } from "@/components/posts/Posts.client";
import getQueryClient from "@/lib/getQueryClient";
import { getPosts } from "@/utils/api";
import { dehydrate } from "@tanstack/react-query";

export default async function PostsPage() {
  const queryClient = getQueryClient();
  await queryClient.prefetchQuery(["posts"], getPosts);
  const dehydratedState = dehydrate(queryClient);

  return (
    <ReactQueryHydrate state={dehydratedState}>
      <Posts />
    </ReactQueryHydrate>
  );
}
"#;

const POST_TYPED: &str = r#""use client";

import React from "react";

interface Props {
  post: {
    userId: number;
    id: number;
    title: string;
    body: string;
  };
}

export const Post = ({ post }: Props) => {
  return (
    <div className="py-4">
      <p className="text-2xl font-semibold">{post.title}</p>
      <p className="mt-2 text-gray-200">{post.body}</p>
    </div>
  );
};
"#;

const POST_UNTYPED: &str = r#""use client";

import React from "react";

export const Post = ({ post }) => {
  return (
    <div className="py-4">
      <p className="text-2xl font-semibold">{post.title}</p>
      <p className="mt-2 text-gray-200">{post.body}</p>
    </div>
  );
};
"#;

const POSTS_TYPED: &str = r#""use client";

import { getPosts } from "@/utils/api";
import { useQuery } from "@tanstack/react-query";
import React from "react";
import { Post } from "./Post.client";

type PostType = {
  userId: number;
  id: number;
  title: string;
  body: string;
};

export const Posts = () => {
  const { data } = useQuery<PostType[]>({
    queryKey: ["posts"],
    queryFn: getPosts,
  });

  if (!data) return <div>Not found</div>;

  return (
    <div className="divide-y">
      {data.map(post => (
        <Post post={post} key={post.id} />
      ))}
    </div>
  );
};
"#;

const POSTS_UNTYPED: &str = r#""use client";

import { getPosts } from "@/utils/api";
import { useQuery } from "@tanstack/react-query";
import React from "react";
import { Post } from "./Post.client";

export const Posts = () => {
  const { data } = useQuery({
    queryKey: ["posts"],
    queryFn: getPosts,
  });

  if (!data) return <div>Not found</div>;

  return (
    <div className="divide-y">
      {data.map(post => (
        <Post post={post} key={post.id} />
      ))}
    </div>
  );
};
"#;

const PROVIDERS_TYPED: &str = r#""use client";

import { queryClientOptions } from "@/lib/queryClientOptions";
import { QueryClient, QueryClientProvider } from "@tanstack/react-query";
import React, { ReactNode, useState } from "react";

interface Props {
  children: ReactNode;
}

export const Providers = ({ children }: Props) => {
  const [queryClient] = useState(() => new QueryClient(queryClientOptions));

  return (
    <QueryClientProvider client={queryClient}>{children}</QueryClientProvider>
  );
};
"#;

const PROVIDERS_UNTYPED: &str = r#""use client";

import { queryClientOptions } from "@/lib/queryClientOptions";
import { QueryClient, QueryClientProvider } from "@tanstack/react-query";
import React, { useState } from "react";

export const Providers = ({ children }) => {
  const [queryClient] = useState(() => new QueryClient(queryClientOptions));

  return (
    <QueryClientProvider client={queryClient}>{children}</QueryClientProvider>
  );
};
"#;

const HYDRATE_TYPED: &str = r#""use client";

import { Hydrate as RQHydrate, HydrateProps } from "@tanstack/react-query";

export const ReactQueryHydrate = (props: HydrateProps) => {
  return <RQHydrate {...props} />;
};
"#;

const HYDRATE_UNTYPED: &str = r#""use client";

import { Hydrate as RQHydrate } from "@tanstack/react-query";

export const ReactQueryHydrate = (props) => {
  return <RQHydrate {...props} />;
};
"#;

pub const PROVIDERS_IMPORT: &str =
    r#"import { Providers } from "@/components/Providers/Providers.client";"#;

pub fn plugin() -> Result<PluginDescriptor, DomainError> {
    let posts = ["src", "components", "posts"];
    let [axios, cookies] = http_client::api_packages();

    PluginDescriptor::builder(PluginId::new(ID))
        .name("Data fetching")
        .description("React Query with SSR hydration and an axios api client")
        .initializing_message("Adding React Query, Please wait !")
        .tag("react-query")
        .tag("http")
        .supports(ProjectKind::NextApp)
        .file(http_client::env_file())
        .file(http_client::api_file())
        .file(
            FileSpec::new(
                "queryClientOptions",
                FileType::Native,
                FileContent::literal(QUERY_CLIENT_OPTIONS),
            )
            .at(["src", "lib"]),
        )
        .file(
            FileSpec::new("getQueryClient", FileType::Native, FileContent::literal(GET_QUERY_CLIENT))
                .at(["src", "lib"]),
        )
        .file(
            FileSpec::new(
                "Post.client",
                FileType::Component,
                FileContent::typed(POST_TYPED, POST_UNTYPED),
            )
            .at(posts),
        )
        .file(
            FileSpec::new(
                "Posts.client",
                FileType::Component,
                FileContent::typed(POSTS_TYPED, POSTS_UNTYPED),
            )
            .at(posts),
        )
        .file(
            FileSpec::new(
                "Providers.client",
                FileType::Component,
                FileContent::typed(PROVIDERS_TYPED, PROVIDERS_UNTYPED),
            )
            .at(["src", "components", "Providers"]),
        )
        .file(
            FileSpec::new(
                "ReactQueryHydrate",
                FileType::Component,
                FileContent::typed(HYDRATE_TYPED, HYDRATE_UNTYPED),
            )
            .at(["src", "components", "ReactQueryHydrate"]),
        )
        .file(
            FileSpec::new("page", FileType::Component, FileContent::literal(POSTS_PAGE))
                .at(["src", "app", "posts"]),
        )
        .modify(
            LogicalFileAlias::layout(),
            ModificationSpec::new()
                .imports(PROVIDERS_IMPORT)
                .wrap("{children}", "<Providers>", "</Providers>"),
        )
        .modify(LogicalFileAlias::page(), ModificationSpec::new())
        .package(PackageSpec::runtime("@tanstack/react-query"))
        .package(PackageSpec::runtime("@tanstack/react-query-devtools"))
        .package(axios)
        .package(cookies)
        .dependencies(|ctx: &ConfigContext| http_client::cookie_types(ctx))
        .build()
}
